// Publish protocol constants (no magic values)
use std::time::Duration;

/// Delay between container status polls (5s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum time to wait for a container to become ready (5 minutes)
pub const DEFAULT_POLL_MAX_WAIT: Duration = Duration::from_secs(300);
