// Post Repository Port (Interface)

use crate::domain::{Post, PostId, PostStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Listing filter for operator queries
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub account_id: Option<String>,
}

/// The next due post, as selected by `claim_next`
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimedPost {
    Ready(Post),
    /// The row is due but could not be decoded
    Unreadable { id: PostId, reason: String },
}

/// Repository interface for Post persistence
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post
    async fn insert(&self, post: &Post) -> Result<()>;

    /// Find post by ID
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>>;

    /// Select the oldest-created PLANNED post whose schedule has passed
    ///
    /// Read-only: the caller performs the transition and persists it with
    /// `save`. Safe for the single-worker scheduler only. A due row that
    /// cannot be decoded is still returned, as `ClaimedPost::Unreadable`.
    async fn claim_next(&self, now_millis: i64) -> Result<Option<ClaimedPost>>;

    /// Overwrite every mutable field of an existing post
    async fn save(&self, post: &Post) -> Result<()>;

    /// Fail a PLANNED post by id without loading it, counting one attempt
    async fn fail_unreadable(&self, id: &PostId, error: &str) -> Result<()>;

    /// Find all posts in a status, oldest first
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>>;

    /// List posts, newest first
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    /// Delete a post, returns whether a row was removed
    async fn delete(&self, id: &PostId) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{Account, Media};
    use crate::error::AppError;
    use crate::port::CatalogRepository;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory post + catalog store
    #[derive(Default)]
    pub struct InMemoryStore {
        posts: Mutex<Vec<Post>>,
        accounts: Mutex<HashMap<String, Account>>,
        media: Mutex<HashMap<String, Media>>,
        saves: Mutex<Vec<Post>>,
        unreadable: Mutex<Vec<(PostId, String)>>,
        unreadable_failures: Mutex<Vec<(PostId, String)>>,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every post snapshot passed to `save`, in call order
        pub fn saved(&self) -> Vec<Post> {
            self.saves.lock().unwrap().clone()
        }

        pub fn get(&self, id: &str) -> Option<Post> {
            self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()
        }

        /// Add a due row that fails to decode; it is claimed before any post
        pub fn insert_unreadable(&self, id: &str, reason: &str) {
            self.unreadable
                .lock()
                .unwrap()
                .push((id.to_string(), reason.to_string()));
        }

        /// Every `(id, error)` passed to `fail_unreadable`
        pub fn unreadable_failures(&self) -> Vec<(PostId, String)> {
            self.unreadable_failures.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PostRepository for InMemoryStore {
        async fn insert(&self, post: &Post) -> Result<()> {
            self.posts.lock().unwrap().push(post.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>> {
            Ok(self.get(id))
        }

        async fn claim_next(&self, now_millis: i64) -> Result<Option<ClaimedPost>> {
            if let Some((id, reason)) = self.unreadable.lock().unwrap().first().cloned() {
                return Ok(Some(ClaimedPost::Unreadable { id, reason }));
            }
            let posts = self.posts.lock().unwrap();
            Ok(posts
                .iter()
                .filter(|p| p.is_due(now_millis))
                .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
                .cloned()
                .map(ClaimedPost::Ready))
        }

        async fn save(&self, post: &Post) -> Result<()> {
            let mut posts = self.posts.lock().unwrap();
            let slot = posts
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post.id)))?;
            *slot = post.clone();
            self.saves.lock().unwrap().push(post.clone());
            Ok(())
        }

        async fn fail_unreadable(&self, id: &PostId, error: &str) -> Result<()> {
            self.unreadable.lock().unwrap().retain(|(pending, _)| pending != id);
            self.unreadable_failures
                .lock()
                .unwrap()
                .push((id.clone(), error.to_string()));
            Ok(())
        }

        async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
            let mut found: Vec<Post> = self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.status == status)
                .cloned()
                .collect();
            found.sort_by_key(|p| p.created_at);
            Ok(found)
        }

        async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>> {
            let mut found: Vec<Post> = self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| filter.status.map_or(true, |s| p.status == s))
                .filter(|p| {
                    filter
                        .account_id
                        .as_ref()
                        .map_or(true, |a| &p.account_id == a)
                })
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn delete(&self, id: &PostId) -> Result<bool> {
            let mut posts = self.posts.lock().unwrap();
            let before = posts.len();
            posts.retain(|p| &p.id != id);
            Ok(posts.len() != before)
        }
    }

    #[async_trait]
    impl CatalogRepository for InMemoryStore {
        async fn find_account(&self, id: &str) -> Result<Option<Account>> {
            Ok(self.accounts.lock().unwrap().get(id).cloned())
        }

        async fn find_media(&self, id: &str) -> Result<Option<Media>> {
            Ok(self.media.lock().unwrap().get(id).cloned())
        }

        async fn insert_account(&self, account: &Account) -> Result<()> {
            self.accounts
                .lock()
                .unwrap()
                .insert(account.id.clone(), account.clone());
            Ok(())
        }

        async fn insert_media(&self, media: &Media) -> Result<()> {
            self.media
                .lock()
                .unwrap()
                .insert(media.id.clone(), media.clone());
            Ok(())
        }
    }
}
