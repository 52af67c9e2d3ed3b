// Schedule Use Case

use crate::domain::Post;
use crate::error::{AppError, Result};
use crate::port::{CatalogRepository, IdProvider, PostRepository, TimeProvider};
use serde::{Deserialize, Serialize};

/// Platform caption limit (characters)
pub const MAX_CAPTION_CHARS: usize = 2200;

/// Platform hashtag limit per post
pub const MAX_TAGS: usize = 30;

/// Schedule request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub account_id: String,
    pub media_id: String,

    #[serde(default)]
    pub caption: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Epoch ms; `None` publishes on the next tick
    #[serde(default)]
    pub scheduled_at: Option<i64>,

    #[serde(default)]
    pub created_by: Option<String>,
}

/// Validate request fields that do not need storage
pub fn validate_request(req: &ScheduleRequest) -> Result<()> {
    if req.account_id.trim().is_empty() {
        return Err(AppError::Validation("account_id cannot be empty".to_string()));
    }
    if req.media_id.trim().is_empty() {
        return Err(AppError::Validation("media_id cannot be empty".to_string()));
    }
    if let Some(caption) = &req.caption {
        let len = caption.chars().count();
        if len > MAX_CAPTION_CHARS {
            return Err(AppError::Validation(format!(
                "caption too long: {} chars (max {})",
                len, MAX_CAPTION_CHARS
            )));
        }
    }
    if req.tags.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "too many tags: {} (max {})",
            req.tags.len(),
            MAX_TAGS
        )));
    }
    Ok(())
}

/// Create a PLANNED post
///
/// The account and media must exist and the media must belong to the
/// account.
pub async fn execute(
    post_repo: &dyn PostRepository,
    catalog: &dyn CatalogRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: ScheduleRequest,
) -> Result<Post> {
    validate_request(&req)?;

    let account = catalog
        .find_account(&req.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", req.account_id)))?;
    let media = catalog
        .find_media(&req.media_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Media {} not found", req.media_id)))?;
    if media.account_id != account.id {
        return Err(AppError::Validation(format!(
            "Media {} belongs to another account",
            media.id
        )));
    }

    let mut post = Post::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        account.id,
        media.id,
    );
    post.caption = req.caption;
    post.tags = req.tags;
    post.scheduled_at = req.scheduled_at;
    post.created_by = req.created_by;

    post_repo.insert(&post).await?;
    Ok(post)
}
