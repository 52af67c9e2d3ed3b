// Post Service - intake and operator actions
//
// Nothing here runs automatically; every call is an explicit external action.

pub mod schedule;

pub use schedule::ScheduleRequest;

use crate::domain::{Post, PostId, PostStatus};
use crate::error::{AppError, Result};
use crate::port::{CatalogRepository, IdProvider, PostFilter, PostRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    catalog: Arc<dyn CatalogRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        catalog: Arc<dyn CatalogRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            post_repo,
            catalog,
            id_provider,
            time_provider,
        }
    }

    /// Schedule a new post
    pub async fn schedule(&self, req: ScheduleRequest) -> Result<Post> {
        let post = schedule::execute(
            self.post_repo.as_ref(),
            self.catalog.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await?;
        info!(post_id = %post.id, scheduled_at = ?post.scheduled_at, "Post scheduled");
        Ok(post)
    }

    pub async fn get(&self, id: &PostId) -> Result<Post> {
        self.post_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        self.post_repo.list(filter).await
    }

    /// PLANNED -> PAUSED
    pub async fn pause(&self, id: &PostId) -> Result<Post> {
        self.apply(id, "paused", Post::pause).await
    }

    /// PAUSED -> PLANNED
    pub async fn resume(&self, id: &PostId) -> Result<Post> {
        self.apply(id, "resumed", Post::resume).await
    }

    /// FAILED -> PLANNED, the manual way to retry a failed post
    pub async fn requeue(&self, id: &PostId) -> Result<Post> {
        self.apply(id, "requeued", Post::requeue).await
    }

    /// Delete a post that the scheduler is not working on
    pub async fn delete(&self, id: &PostId) -> Result<()> {
        let post = self.get(id).await?;
        if post.status == PostStatus::Publishing {
            return Err(AppError::Validation(format!(
                "Post {} is being published and cannot be deleted",
                id
            )));
        }
        self.post_repo.delete(id).await?;
        info!(post_id = %id, "Post deleted");
        Ok(())
    }

    async fn apply(
        &self,
        id: &PostId,
        action: &str,
        transition: fn(&mut Post) -> crate::domain::error::Result<()>,
    ) -> Result<Post> {
        let mut post = self.get(id).await?;
        transition(&mut post)?;
        self.post_repo.save(&post).await?;
        info!(post_id = %post.id, status = %post.status, "Post {}", action);
        Ok(post)
    }
}
