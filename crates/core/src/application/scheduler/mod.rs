// Scheduler - periodic publish loop

pub mod constants;
mod panic_guard;
mod shutdown;

pub use panic_guard::panic_message;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::state_machine::{PublishStateMachine, Transition};
use crate::domain::{Post, PostId, PostStatus, PublishFailure};
use crate::error::Result;
use crate::port::{
    CatalogRepository, ClaimedPost, MediaUrlResolver, PostRepository, PublishRequest, Publisher,
    TimeProvider,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Appended when a post fails after the platform may already have published it
const OUTCOME_UNKNOWN_HINT: &str =
    "publish outcome unknown; verify on the platform before requeueing";

/// Result of one scheduler cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was due
    Idle,
    Published { post_id: PostId, external_id: String },
    Failed { post_id: PostId, kind: &'static str },
    /// Claimed post was no longer PLANNED
    Skipped { post_id: PostId },
}

/// Single-worker scheduler: one post per tick, one tick at a time
pub struct Scheduler {
    post_repo: Arc<dyn PostRepository>,
    catalog: Arc<dyn CatalogRepository>,
    publisher: Arc<dyn Publisher>,
    url_resolver: Arc<dyn MediaUrlResolver>,
    time_provider: Arc<dyn TimeProvider>,
    state_machine: PublishStateMachine,
    tick_interval: Duration,
}

impl Scheduler {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        catalog: Arc<dyn CatalogRepository>,
        publisher: Arc<dyn Publisher>,
        url_resolver: Arc<dyn MediaUrlResolver>,
        time_provider: Arc<dyn TimeProvider>,
        tick_interval: Duration,
    ) -> Self {
        let state_machine =
            PublishStateMachine::new(Arc::clone(&post_repo), Arc::clone(&time_provider));
        Self {
            post_repo,
            catalog,
            publisher,
            url_resolver,
            time_provider,
            state_machine,
            tick_interval,
        }
    }

    /// Run the loop until shutdown is signalled
    ///
    /// Cycle errors and panics are logged here and never end the loop.
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(tick_ms = self.tick_interval.as_millis() as u64, "Scheduler started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            match AssertUnwindSafe(self.process_next_post()).catch_unwind().await {
                Ok(Ok(CycleOutcome::Idle)) => {}
                Ok(Ok(outcome)) => debug!(?outcome, "Scheduler cycle finished"),
                Ok(Err(e)) => error!(error = %e, "Scheduler cycle failed"),
                Err(payload) => error!(
                    panic_msg = %panic_message(payload),
                    "Scheduler cycle panicked"
                ),
            }

            tokio::select! {
                _ = sleep(self.tick_interval) => {},
                _ = shutdown.wait() => {
                    info!("Scheduler interrupted during sleep");
                    break;
                }
            }
        }
        info!("Scheduler stopped");
    }

    /// Claim and publish at most one due post
    ///
    /// Once a post is claimed, any error or panic while handling it is
    /// recorded on that post as an unclassified failure.
    pub async fn process_next_post(&self) -> Result<CycleOutcome> {
        let now = self.time_provider.now_millis();
        let post = match self.post_repo.claim_next(now).await? {
            Some(ClaimedPost::Ready(post)) => post,
            Some(ClaimedPost::Unreadable { id, reason }) => {
                return self.fail_unreadable(id, reason).await;
            }
            None => {
                debug!("No planned posts to publish");
                return Ok(CycleOutcome::Idle);
            }
        };

        info!(post_id = %post.id, "Processing planned post");
        let post_id = post.id.clone();

        match AssertUnwindSafe(self.process_claimed(post))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => self.record_unclassified(post_id, e.to_string()).await,
            Err(payload) => {
                self.record_unclassified(post_id, panic_message(payload))
                    .await
            }
        }
    }

    async fn process_claimed(&self, mut post: Post) -> Result<CycleOutcome> {
        let request = match self.prepare(&post).await? {
            Ok(request) => request,
            Err(failure) => {
                return match self.state_machine.reject(&mut post, &failure).await? {
                    Transition::Applied => Ok(CycleOutcome::Failed {
                        post_id: post.id,
                        kind: failure.kind(),
                    }),
                    Transition::Skipped => Ok(CycleOutcome::Skipped { post_id: post.id }),
                };
            }
        };

        // Durable before any network call
        if self.state_machine.begin(&mut post).await? == Transition::Skipped {
            return Ok(CycleOutcome::Skipped { post_id: post.id });
        }

        match self.publish_isolated(&post, request).await {
            Ok(external_id) => {
                self.state_machine.succeed(&mut post, &external_id).await?;
                Ok(CycleOutcome::Published {
                    post_id: post.id,
                    external_id,
                })
            }
            Err(failure) => {
                self.state_machine.fail(&mut post, &failure).await?;
                Ok(CycleOutcome::Failed {
                    post_id: post.id,
                    kind: failure.kind(),
                })
            }
        }
    }

    /// Fail a due row that cannot be decoded so younger posts are not blocked
    async fn fail_unreadable(&self, id: PostId, reason: String) -> Result<CycleOutcome> {
        let failure =
            PublishFailure::Unclassified(format!("stored post could not be read: {}", reason));
        error!(post_id = %id, error = %failure, "Unreadable post claimed");

        self.post_repo.fail_unreadable(&id, &failure.to_string()).await?;
        Ok(CycleOutcome::Failed {
            post_id: id,
            kind: failure.kind(),
        })
    }

    /// Record an error raised outside the publisher on the claimed post
    ///
    /// The post is reloaded since the in-memory copy may be ahead of the store.
    async fn record_unclassified(&self, post_id: PostId, cause: String) -> Result<CycleOutcome> {
        error!(post_id = %post_id, error = %cause, "Publish cycle failed outside the publisher");

        let Some(mut post) = self.post_repo.find_by_id(&post_id).await? else {
            return Ok(CycleOutcome::Skipped { post_id });
        };

        let failure = match post.status {
            PostStatus::Planned => {
                let failure = PublishFailure::Unclassified(cause);
                self.state_machine.reject(&mut post, &failure).await?;
                failure
            }
            PostStatus::Publishing => {
                let failure =
                    PublishFailure::Unclassified(format!("{} ({})", cause, OUTCOME_UNKNOWN_HINT));
                self.state_machine.fail(&mut post, &failure).await?;
                failure
            }
            status => {
                warn!(
                    post_id = %post_id,
                    status = %status,
                    "Claimed post is no longer in flight, failure not recorded"
                );
                return Ok(CycleOutcome::Skipped { post_id });
            }
        };

        Ok(CycleOutcome::Failed {
            post_id,
            kind: failure.kind(),
        })
    }

    /// Fetch account + media once and build the publish request
    async fn prepare(&self, post: &Post) -> Result<std::result::Result<PublishRequest, PublishFailure>> {
        let account = self.catalog.find_account(&post.account_id).await?;
        let media = self.catalog.find_media(&post.media_id).await?;

        let (account, media) = match (account, media) {
            (Some(account), Some(media)) => (account, media),
            (account, media) => {
                let mut missing = Vec::new();
                if account.is_none() {
                    missing.push(format!("account {}", post.account_id));
                }
                if media.is_none() {
                    missing.push(format!("media {}", post.media_id));
                }
                return Ok(Err(PublishFailure::Validation(format!(
                    "{} not found",
                    missing.join(" and ")
                ))));
            }
        };

        let media_url = match self.url_resolver.resolve(&media) {
            Ok(url) => url,
            Err(failure) => return Ok(Err(failure)),
        };

        Ok(Ok(PublishRequest {
            credentials: account.credentials(),
            media_url,
            caption: post.caption.clone(),
            tags: post.tags.clone(),
        }))
    }

    /// Run the publisher on its own task so a panic becomes a failure
    async fn publish_isolated(
        &self,
        post: &Post,
        request: PublishRequest,
    ) -> std::result::Result<String, PublishFailure> {
        let publisher = Arc::clone(&self.publisher);
        let handle = tokio::task::spawn(async move { publisher.publish(request).await });

        let external_id = match handle.await {
            Ok(result) => result?,
            Err(join_err) => {
                let msg = if join_err.is_panic() {
                    panic_message(join_err.into_panic())
                } else {
                    "publish task cancelled".to_string()
                };
                error!(post_id = %post.id, panic_msg = %msg, "Publish task aborted");
                return Err(PublishFailure::Unclassified(msg));
            }
        };

        if external_id.trim().is_empty() {
            return Err(PublishFailure::Protocol(
                "publisher returned an empty external id".to_string(),
            ));
        }
        Ok(external_id)
    }
}
