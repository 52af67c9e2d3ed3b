// Scheduler constants (no magic values)
use std::time::Duration;

/// Sleep between scheduler ticks (5s)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Posts stuck in PUBLISHING longer than this at startup are treated as
/// interrupted (10 minutes, twice the readiness poll budget)
pub const DEFAULT_RECOVERY_WINDOW_MS: i64 = 10 * 60 * 1000;
