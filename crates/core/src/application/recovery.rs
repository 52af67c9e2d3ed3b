// Crash recovery logic
use crate::domain::{Post, PostStatus, PublishFailure};
use crate::port::{PostRepository, TimeProvider};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::scheduler::constants::DEFAULT_RECOVERY_WINDOW_MS;

/// Crash recovery service
///
/// On daemon startup, detects posts that were PUBLISHING when the daemon
/// stopped. The platform call may or may not have gone through, so these
/// posts are failed for an operator to inspect and requeue.
pub struct RecoveryService {
    post_repo: Arc<dyn PostRepository>,
    time_provider: Arc<dyn TimeProvider>,
    recovery_window_ms: i64,
}

impl RecoveryService {
    /// Create a new recovery service
    ///
    /// # Arguments
    /// * `post_repo` - Post repository
    /// * `time_provider` - Time provider
    /// * `recovery_window_ms` - Optional custom recovery window (default: 10 minutes)
    ///
    /// # Example
    /// ```ignore
    /// let recovery = RecoveryService::new(post_repo, time_provider, None);
    /// recovery.recover_interrupted().await?;
    /// ```
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        time_provider: Arc<dyn TimeProvider>,
        recovery_window_ms: Option<i64>,
    ) -> Self {
        Self {
            post_repo,
            time_provider,
            recovery_window_ms: recovery_window_ms.unwrap_or(DEFAULT_RECOVERY_WINDOW_MS),
        }
    }

    /// Fail interrupted posts
    ///
    /// A PUBLISHING post is interrupted when `publish_started_at` is older
    /// than the recovery window, or missing altogether.
    ///
    /// # Returns
    /// Number of posts recovered
    pub async fn recover_interrupted(&self) -> crate::error::Result<usize> {
        let now = self.time_provider.now_millis();
        let cutoff = now - self.recovery_window_ms;

        info!(
            cutoff_time = %cutoff,
            recovery_window_ms = %self.recovery_window_ms,
            "Starting interrupted post recovery"
        );

        let publishing = self.post_repo.find_by_status(PostStatus::Publishing).await?;
        let mut recovered_count = 0;

        for mut post in publishing {
            match post.publish_started_at {
                Some(started_at) if started_at >= cutoff => continue,
                Some(started_at) => {
                    info!(post_id = %post.id, started_at = %started_at, "Recovering interrupted post");
                }
                None => {
                    warn!(post_id = %post.id, "PUBLISHING post without publish_started_at");
                }
            }

            self.fail_interrupted(&mut post).await?;
            recovered_count += 1;
        }

        info!(recovered_count = %recovered_count, "Interrupted post recovery complete");
        Ok(recovered_count)
    }

    async fn fail_interrupted(&self, post: &mut Post) -> crate::error::Result<()> {
        let failure = PublishFailure::Unclassified(
            "publish interrupted before completion; verify on the platform before requeueing"
                .to_string(),
        );
        post.mark_failed(&failure)?;
        self.post_repo.save(post).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::post_repository::mocks::InMemoryStore;
    use crate::port::time_provider::mocks::ManualClock;

    const NOW: i64 = 100 * 60 * 1000;

    async fn seed(store: &InMemoryStore, id: &str, started_at: Option<i64>) {
        let mut post = Post::new(id, 0, "acc-1", "media-1");
        post.status = PostStatus::Publishing;
        post.attempt = 1;
        post.publish_started_at = started_at;
        store.insert(&post).await.unwrap();
    }

    fn service(store: Arc<InMemoryStore>) -> RecoveryService {
        RecoveryService::new(store, Arc::new(ManualClock::new(NOW)), None)
    }

    #[tokio::test]
    async fn test_stale_publishing_post_is_failed() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "stale", Some(NOW - DEFAULT_RECOVERY_WINDOW_MS - 1)).await;

        let recovered = service(store.clone()).recover_interrupted().await.unwrap();

        assert_eq!(recovered, 1);
        let post = store.get("stale").unwrap();
        assert_eq!(post.status, PostStatus::Failed);
        assert_eq!(post.attempt, 1);
        assert!(post.error.unwrap().contains("interrupted"));
    }

    #[tokio::test]
    async fn test_recent_publishing_post_is_left_alone() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "fresh", Some(NOW - 1_000)).await;

        let recovered = service(store.clone()).recover_interrupted().await.unwrap();

        assert_eq!(recovered, 0);
        assert_eq!(store.get("fresh").unwrap().status, PostStatus::Publishing);
    }

    #[tokio::test]
    async fn test_missing_start_time_is_failed() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "odd", None).await;

        let recovered = service(store.clone()).recover_interrupted().await.unwrap();

        assert_eq!(recovered, 1);
        assert_eq!(store.get("odd").unwrap().status, PostStatus::Failed);
    }

    #[tokio::test]
    async fn test_custom_window() {
        let store = Arc::new(InMemoryStore::new());
        seed(&store, "p", Some(NOW - 2_000)).await;

        let service = RecoveryService::new(store.clone(), Arc::new(ManualClock::new(NOW)), Some(1_000));

        assert_eq!(service.recover_interrupted().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_other_statuses_untouched() {
        let store = Arc::new(InMemoryStore::new());
        store.insert(&Post::new("planned", 0, "acc-1", "media-1")).await.unwrap();

        assert_eq!(service(store.clone()).recover_interrupted().await.unwrap(), 0);
        assert_eq!(store.get("planned").unwrap().status, PostStatus::Planned);
    }
}
