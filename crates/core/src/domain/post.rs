// Post Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::failure::PublishFailure;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Post ID (UUID v4)
pub type PostId = String;

/// Post status
///
/// `Paused` is set and cleared by operators only; the scheduler never enters
/// or reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Planned,
    Publishing,
    Published,
    Failed,
    Paused,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Planned => "planned",
            PostStatus::Publishing => "publishing",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
            PostStatus::Paused => "paused",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planned" => Ok(PostStatus::Planned),
            "publishing" => Ok(PostStatus::Publishing),
            "published" => Ok(PostStatus::Published),
            "failed" => Ok(PostStatus::Failed),
            "paused" => Ok(PostStatus::Paused),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Post entity: one scheduled publish of one media asset to one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub account_id: String,
    pub media_id: String,
    pub caption: Option<String>,
    pub tags: Vec<String>,
    pub scheduled_at: Option<i64>, // epoch ms
    pub status: PostStatus,

    pub attempt: i32,
    pub error: Option<String>,
    pub external_id: Option<String>,
    pub publish_started_at: Option<i64>,
    pub published_at: Option<i64>,

    pub created_by: Option<String>,
    pub created_at: i64, // epoch ms
}

impl Post {
    /// Create a new planned post
    ///
    /// # Arguments
    ///
    /// * `id` - Unique post ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `account_id` - Target account
    /// * `media_id` - Media asset to publish
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        account_id: impl Into<String>,
        media_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            media_id: media_id.into(),
            caption: None,
            tags: Vec::new(),
            scheduled_at: None,
            status: PostStatus::Planned,
            attempt: 0,
            error: None,
            external_id: None,
            publish_started_at: None,
            published_at: None,
            created_by: None,
            created_at,
        }
    }

    /// Whether the scheduler may pick this post up at `now_millis`
    pub fn is_due(&self, now_millis: i64) -> bool {
        self.status == PostStatus::Planned
            && self.scheduled_at.map_or(true, |at| at <= now_millis)
    }

    /// PLANNED -> PUBLISHING
    pub fn begin_publishing(&mut self, now_millis: i64) -> Result<()> {
        self.expect_status(PostStatus::Planned, PostStatus::Publishing)?;
        self.status = PostStatus::Publishing;
        self.publish_started_at = Some(now_millis);
        self.attempt += 1;
        self.error = None;
        Ok(())
    }

    /// PLANNED -> FAILED, for posts that cannot even start (missing references)
    pub fn reject(&mut self, failure: &PublishFailure) -> Result<()> {
        self.expect_status(PostStatus::Planned, PostStatus::Failed)?;
        self.status = PostStatus::Failed;
        self.attempt += 1;
        self.error = Some(failure.to_string());
        Ok(())
    }

    /// PUBLISHING -> PUBLISHED
    pub fn mark_published(&mut self, external_id: impl Into<String>, now_millis: i64) -> Result<()> {
        let external_id = external_id.into();
        if external_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "published post requires an external id".to_string(),
            ));
        }
        self.expect_status(PostStatus::Publishing, PostStatus::Published)?;
        self.status = PostStatus::Published;
        self.external_id = Some(external_id);
        self.published_at = Some(now_millis);
        Ok(())
    }

    /// PUBLISHING -> FAILED
    pub fn mark_failed(&mut self, failure: &PublishFailure) -> Result<()> {
        self.expect_status(PostStatus::Publishing, PostStatus::Failed)?;
        self.status = PostStatus::Failed;
        self.error = Some(failure.to_string());
        Ok(())
    }

    /// PLANNED -> PAUSED (operator action)
    pub fn pause(&mut self) -> Result<()> {
        self.expect_status(PostStatus::Planned, PostStatus::Paused)?;
        self.status = PostStatus::Paused;
        Ok(())
    }

    /// PAUSED -> PLANNED (operator action)
    pub fn resume(&mut self) -> Result<()> {
        self.expect_status(PostStatus::Paused, PostStatus::Planned)?;
        self.status = PostStatus::Planned;
        Ok(())
    }

    /// FAILED -> PLANNED (operator action)
    ///
    /// The attempt counter and last error are kept; `begin_publishing`
    /// clears the error when the next attempt starts.
    pub fn requeue(&mut self) -> Result<()> {
        self.expect_status(PostStatus::Failed, PostStatus::Planned)?;
        self.status = PostStatus::Planned;
        self.publish_started_at = None;
        Ok(())
    }

    fn expect_status(&self, expected: PostStatus, to: PostStatus) -> Result<()> {
        if self.status != expected {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}
