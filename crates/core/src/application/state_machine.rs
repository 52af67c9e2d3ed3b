//! Publish state machine - validated, persisted post transitions
//!
//! ```text
//! PLANNED ──begin──▶ PUBLISHING ──succeed──▶ PUBLISHED
//!    │                    │
//!    └──reject──▶ FAILED ◀┘ fail
//! ```
//!
//! Each transition is saved before the method returns, so `begin` is durable
//! before the caller touches the network.

use crate::domain::{Post, PostStatus, PublishFailure};
use crate::error::Result;
use crate::port::{PostRepository, TimeProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Whether a transition was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Post was not in the expected state; nothing was changed
    Skipped,
}

pub struct PublishStateMachine {
    post_repo: Arc<dyn PostRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PublishStateMachine {
    pub fn new(post_repo: Arc<dyn PostRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            post_repo,
            time_provider,
        }
    }

    /// PLANNED -> PUBLISHING (no-op for any other status)
    pub async fn begin(&self, post: &mut Post) -> Result<Transition> {
        if post.status != PostStatus::Planned {
            debug!(post_id = %post.id, status = %post.status, "Post not planned, skipping claim");
            return Ok(Transition::Skipped);
        }

        let now = self.time_provider.now_millis();
        post.begin_publishing(now)?;
        self.post_repo.save(post).await?;

        info!(
            post_id = %post.id,
            account_id = %post.account_id,
            media_id = %post.media_id,
            attempt = post.attempt,
            "Started publishing post"
        );
        Ok(Transition::Applied)
    }

    /// PLANNED -> FAILED, when the attempt cannot even start
    pub async fn reject(&self, post: &mut Post, failure: &PublishFailure) -> Result<Transition> {
        if post.status != PostStatus::Planned {
            return Ok(Transition::Skipped);
        }

        post.reject(failure)?;
        self.post_repo.save(post).await?;

        warn!(
            post_id = %post.id,
            attempt = post.attempt,
            kind = failure.kind(),
            error = %failure,
            "Post rejected before publishing"
        );
        Ok(Transition::Applied)
    }

    /// PUBLISHING -> PUBLISHED
    pub async fn succeed(&self, post: &mut Post, external_id: &str) -> Result<()> {
        let now = self.time_provider.now_millis();
        post.mark_published(external_id, now)?;
        self.post_repo.save(post).await?;

        info!(post_id = %post.id, external_id = %external_id, "Post published");
        Ok(())
    }

    /// PUBLISHING -> FAILED
    pub async fn fail(&self, post: &mut Post, failure: &PublishFailure) -> Result<()> {
        post.mark_failed(failure)?;
        self.post_repo.save(post).await?;

        warn!(
            post_id = %post.id,
            attempt = post.attempt,
            kind = failure.kind(),
            error = %failure,
            "Post publish failed"
        );
        Ok(())
    }
}
