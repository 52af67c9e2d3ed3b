//! Container readiness polling
//!
//! Pure state machine: the caller feeds it poll results and the current time,
//! it answers with the next step. Sleeping and I/O stay with the caller, so
//! tests drive it with a manual clock.

use crate::domain::PublishFailure;
use crate::port::ContainerStatus;
use std::time::Duration;

use super::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_WAIT};

/// Poll cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_POLL_MAX_WAIT,
        }
    }
}

/// What the driver should do after a poll result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Container is ready, go publish
    Ready,
    /// Sleep for this long, then poll again
    Wait(Duration),
    /// Stop, the attempt failed
    Failed(PublishFailure),
}

/// Readiness poll for one container within one attempt
#[derive(Debug)]
pub struct ReadinessPoll {
    creation_id: String,
    started_at: i64,
    settings: PollSettings,
    polls: u32,
    last_status: Option<String>,
}

impl ReadinessPoll {
    pub fn new(creation_id: impl Into<String>, started_at_millis: i64, settings: PollSettings) -> Self {
        Self {
            creation_id: creation_id.into(),
            started_at: started_at_millis,
            settings,
            polls: 0,
            last_status: None,
        }
    }

    /// Number of poll results observed so far
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    /// Whether the budget still allows another poll at `now_millis`
    pub fn may_poll(&self, now_millis: i64) -> bool {
        self.elapsed(now_millis) < self.settings.max_wait
    }

    /// Classify one poll result
    pub fn observe(&mut self, status: ContainerStatus) -> PollStep {
        self.polls += 1;
        match status {
            ContainerStatus::Ready => {
                self.last_status = Some("FINISHED".to_string());
                PollStep::Ready
            }
            ContainerStatus::Errored { diagnostic } => {
                self.last_status = Some("ERROR".to_string());
                PollStep::Failed(PublishFailure::Protocol(format!(
                    "media container {} processing failed with status ERROR: {}",
                    self.creation_id, diagnostic
                )))
            }
            ContainerStatus::Processing { status } => {
                if status.is_some() {
                    self.last_status = status;
                }
                PollStep::Wait(self.settings.interval)
            }
        }
    }

    /// Failure to record once the budget is spent
    pub fn timeout(&self, now_millis: i64) -> PublishFailure {
        PublishFailure::Timeout {
            creation_id: self.creation_id.clone(),
            waited_secs: self.elapsed(now_millis).as_secs(),
            last_status: self.last_status.clone(),
        }
    }

    fn elapsed(&self, now_millis: i64) -> Duration {
        let millis = now_millis.saturating_sub(self.started_at).max(0);
        Duration::from_millis(millis as u64)
    }
}
