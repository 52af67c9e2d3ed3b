// Catalog Repository Port (accounts & media, read side of the pipeline)

use crate::domain::{Account, Media};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find account by ID
    async fn find_account(&self, id: &str) -> Result<Option<Account>>;

    /// Find media asset by ID
    async fn find_media(&self, id: &str) -> Result<Option<Media>>;

    /// Insert an account (seeding and tests; account CRUD lives elsewhere)
    async fn insert_account(&self, account: &Account) -> Result<()>;

    /// Insert a media asset (seeding and tests; uploads live elsewhere)
    async fn insert_media(&self, media: &Media) -> Result<()>;
}
