// SQLite PostRepository + CatalogRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use reelcast_core::domain::{Account, Media, Post, PostId, PostStatus};
use reelcast_core::error::Result;
use reelcast_core::port::{CatalogRepository, ClaimedPost, PostFilter, PostRepository};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn insert(&self, post: &Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags)?;

        sqlx::query(
            r#"
            INSERT INTO posts (
                id, account_id, media_id, caption, tags, scheduled_at,
                status, attempt, error, external_id, publish_started_at, published_at,
                created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.account_id)
        .bind(&post.media_id)
        .bind(&post.caption)
        .bind(&tags)
        .bind(post.scheduled_at)
        .bind(post.status.as_str())
        .bind(post.attempt)
        .bind(&post.error)
        .bind(&post.external_id)
        .bind(post.publish_started_at)
        .bind(post.published_at)
        .bind(&post.created_by)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(PostRow::into_post).transpose()
    }

    async fn claim_next(&self, now_millis: i64) -> Result<Option<ClaimedPost>> {
        // Select the id alone so an undecodable row still yields its id
        let id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM posts
            WHERE status = 'planned'
              AND (scheduled_at IS NULL OR scheduled_at <= ?)
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(id) = id else {
            return Ok(None);
        };

        let row = match sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(&id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_))) => {
                return Ok(Some(ClaimedPost::Unreadable {
                    id,
                    reason: e.to_string(),
                }));
            }
            Err(e) => return Err(map_sqlx_error(e)),
        };

        match row.into_post() {
            Ok(post) => Ok(Some(ClaimedPost::Ready(post))),
            Err(e) => Ok(Some(ClaimedPost::Unreadable {
                id,
                reason: e.to_string(),
            })),
        }
    }

    async fn save(&self, post: &Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags)?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET account_id = ?, media_id = ?, caption = ?, tags = ?, scheduled_at = ?,
                status = ?, attempt = ?, error = ?, external_id = ?,
                publish_started_at = ?, published_at = ?, created_by = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.account_id)
        .bind(&post.media_id)
        .bind(&post.caption)
        .bind(&tags)
        .bind(post.scheduled_at)
        .bind(post.status.as_str())
        .bind(post.attempt)
        .bind(&post.error)
        .bind(&post.external_id)
        .bind(post.publish_started_at)
        .bind(post.published_at)
        .bind(&post.created_by)
        .bind(&post.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(reelcast_core::AppError::NotFound(format!(
                "Post {} not found",
                post.id
            )));
        }

        Ok(())
    }

    async fn fail_unreadable(&self, id: &PostId, error: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET status = 'failed', attempt = attempt + 1, error = ?
            WHERE id = ? AND status = 'planned'
            "#,
        )
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT * FROM posts
            WHERE status = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM posts WHERE 1 = 1");
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(account_id) = &filter.account_id {
            query.push(" AND account_id = ").push_bind(account_id.as_str());
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<PostRow> = query
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    async fn delete(&self, id: &PostId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CatalogRepository for SqlitePostRepository {
    async fn find_account(&self, id: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(AccountRow::into_account))
    }

    async fn find_media(&self, id: &str) -> Result<Option<Media>> {
        let row = sqlx::query_as::<_, MediaRow>("SELECT * FROM media_assets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(MediaRow::into_media))
    }

    async fn insert_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, platform_user_id, access_token, token_expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.platform_user_id)
        .bind(&account.access_token)
        .bind(account.token_expires_at)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn insert_media(&self, media: &Media) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO media_assets (id, account_id, storage_key, filename, mime, size_bytes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&media.id)
        .bind(&media.account_id)
        .bind(&media.storage_key)
        .bind(&media.filename)
        .bind(&media.mime)
        .bind(media.size_bytes)
        .bind(media.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

/// SQLite row representation of a post
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: String,
    account_id: String,
    media_id: String,
    caption: Option<String>,
    tags: String, // JSON array
    scheduled_at: Option<i64>,
    status: String,
    attempt: i32,
    error: Option<String>,
    external_id: Option<String>,
    publish_started_at: Option<i64>,
    published_at: Option<i64>,
    created_by: Option<String>,
    created_at: i64,
}

impl PostRow {
    fn into_post(self) -> Result<Post> {
        let status: PostStatus = self.status.parse()?;
        let tags: Vec<String> = serde_json::from_str(&self.tags)?;

        Ok(Post {
            id: self.id,
            account_id: self.account_id,
            media_id: self.media_id,
            caption: self.caption,
            tags,
            scheduled_at: self.scheduled_at,
            status,
            attempt: self.attempt,
            error: self.error,
            external_id: self.external_id,
            publish_started_at: self.publish_started_at,
            published_at: self.published_at,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    platform_user_id: String,
    access_token: String,
    token_expires_at: Option<i64>,
    created_at: i64,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            platform_user_id: self.platform_user_id,
            access_token: self.access_token,
            token_expires_at: self.token_expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MediaRow {
    id: String,
    account_id: String,
    storage_key: String,
    filename: String,
    mime: String,
    size_bytes: i64,
    created_at: i64,
}

impl MediaRow {
    fn into_media(self) -> Media {
        Media {
            id: self.id,
            account_id: self.account_id,
            storage_key: self.storage_key,
            filename: self.filename,
            mime: self.mime,
            size_bytes: self.size_bytes,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use reelcast_core::domain::PublishFailure;
    use reelcast_core::AppError;

    async fn setup_test_db() -> SqlitePostRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqlitePostRepository::new(pool)
    }

    fn post(id: &str, created_at: i64) -> Post {
        let mut post = Post::new(id, created_at, "acc-1", "media-1");
        post.caption = Some("Launch day".to_string());
        post.tags = vec!["reels".to_string(), "launch".to_string()];
        post
    }

    async fn claimed_post(repo: &SqlitePostRepository, now: i64) -> Post {
        match repo.claim_next(now).await.unwrap() {
            Some(ClaimedPost::Ready(post)) => post,
            other => panic!("expected a decodable post, got {:?}", other),
        }
    }

    fn account() -> Account {
        Account {
            id: "acc-1".to_string(),
            name: "Brand".to_string(),
            platform_user_id: "17841400000000000".to_string(),
            access_token: "EAABsbCS1iHgBAKZBZC0token9xyz".to_string(),
            token_expires_at: Some(9_999_999),
            created_at: 1,
        }
    }

    fn media() -> Media {
        Media {
            id: "media-1".to_string(),
            account_id: "acc-1".to_string(),
            storage_key: "reels/2024/launch.mp4".to_string(),
            filename: "launch.mp4".to_string(),
            mime: "video/mp4".to_string(),
            size_bytes: 10_485_760,
            created_at: 2,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup_test_db().await;
        let post = post("post-1", 1_000);

        repo.insert(&post).await.unwrap();

        let found = repo.find_by_id(&post.id).await.unwrap();
        assert_eq!(found, Some(post));
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repo = setup_test_db().await;
        assert!(repo.find_by_id(&"nope".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_claim_next_oldest_created_first() {
        let repo = setup_test_db().await;
        repo.insert(&post("newer", 2_000)).await.unwrap();
        repo.insert(&post("older", 1_000)).await.unwrap();

        let claimed = claimed_post(&repo, 10_000).await;
        assert_eq!(claimed.id, "older");
    }

    #[tokio::test]
    async fn test_claim_next_ties_broken_by_id() {
        let repo = setup_test_db().await;
        repo.insert(&post("post-b", 1_000)).await.unwrap();
        repo.insert(&post("post-a", 1_000)).await.unwrap();

        let claimed = claimed_post(&repo, 10_000).await;
        assert_eq!(claimed.id, "post-a");
    }

    #[tokio::test]
    async fn test_claim_next_skips_future_and_non_planned() {
        let repo = setup_test_db().await;

        let mut future = post("future", 1_000);
        future.scheduled_at = Some(50_000);
        repo.insert(&future).await.unwrap();

        let mut paused = post("paused", 500);
        paused.status = PostStatus::Paused;
        repo.insert(&paused).await.unwrap();

        assert!(repo.claim_next(10_000).await.unwrap().is_none());

        let claimed = claimed_post(&repo, 50_000).await;
        assert_eq!(claimed.id, "future");
    }

    #[tokio::test]
    async fn test_claim_next_is_read_only() {
        let repo = setup_test_db().await;
        repo.insert(&post("post-1", 1_000)).await.unwrap();

        repo.claim_next(10_000).await.unwrap();

        let stored = repo.find_by_id(&"post-1".to_string()).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Planned);
        assert_eq!(stored.attempt, 0);
    }

    #[tokio::test]
    async fn test_save_persists_transitions() {
        let repo = setup_test_db().await;
        let mut post = post("post-1", 1_000);
        repo.insert(&post).await.unwrap();

        post.begin_publishing(5_000).unwrap();
        repo.save(&post).await.unwrap();
        post.mark_failed(&PublishFailure::Transport("connection reset".to_string()))
            .unwrap();
        repo.save(&post).await.unwrap();

        let stored = repo.find_by_id(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PostStatus::Failed);
        assert_eq!(stored.attempt, 1);
        assert_eq!(stored.publish_started_at, Some(5_000));
        assert!(stored.error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_save_missing_post() {
        let repo = setup_test_db().await;

        let err = repo.save(&post("ghost", 1_000)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let repo = setup_test_db().await;
        repo.insert(&post("post-1", 1_000)).await.unwrap();

        let err = repo.insert(&post("post-1", 1_000)).await.unwrap_err();
        assert!(err.to_string().contains("Unique constraint"));
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let repo = setup_test_db().await;
        let mut publishing = post("publishing", 2_000);
        publishing.status = PostStatus::Publishing;
        repo.insert(&publishing).await.unwrap();
        repo.insert(&post("planned", 1_000)).await.unwrap();

        let found = repo.find_by_status(PostStatus::Publishing).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "publishing");
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let repo = setup_test_db().await;
        repo.insert(&post("first", 1_000)).await.unwrap();
        repo.insert(&post("second", 2_000)).await.unwrap();
        let mut other = post("other-account", 3_000);
        other.account_id = "acc-2".to_string();
        repo.insert(&other).await.unwrap();

        let all = repo.list(&PostFilter::default()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["other-account", "second", "first"]);

        let filtered = repo
            .list(&PostFilter {
                status: Some(PostStatus::Planned),
                account_id: Some("acc-1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup_test_db().await;
        repo.insert(&post("post-1", 1_000)).await.unwrap();

        assert!(repo.delete(&"post-1".to_string()).await.unwrap());
        assert!(!repo.delete(&"post-1".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_catalog_round_trip() {
        let repo = setup_test_db().await;
        repo.insert_account(&account()).await.unwrap();
        repo.insert_media(&media()).await.unwrap();

        assert_eq!(repo.find_account("acc-1").await.unwrap(), Some(account()));
        assert_eq!(repo.find_media("media-1").await.unwrap(), Some(media()));
        assert!(repo.find_account("acc-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_media_requires_account() {
        let repo = setup_test_db().await;

        let err = repo.insert_media(&media()).await.unwrap_err();
        assert!(err.to_string().contains("Foreign key"));
    }

    #[tokio::test]
    async fn test_corrupt_tags_surface_serialization_error() {
        let repo = setup_test_db().await;
        repo.insert(&post("post-1", 1_000)).await.unwrap();
        sqlx::query("UPDATE posts SET tags = 'not json' WHERE id = 'post-1'")
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.find_by_id(&"post-1".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_claim_next_returns_unreadable_row_by_id() {
        let repo = setup_test_db().await;
        repo.insert(&post("corrupt", 1_000)).await.unwrap();
        repo.insert(&post("healthy", 2_000)).await.unwrap();
        sqlx::query("UPDATE posts SET tags = 'not json' WHERE id = 'corrupt'")
            .execute(&repo.pool)
            .await
            .unwrap();

        let Some(ClaimedPost::Unreadable { id, reason }) = repo.claim_next(10_000).await.unwrap()
        else {
            panic!("expected the corrupt row to be claimed as unreadable");
        };
        assert_eq!(id, "corrupt");
        assert!(reason.contains("Serialization"));

        repo.fail_unreadable(&id, "stored post could not be read")
            .await
            .unwrap();

        let claimed = claimed_post(&repo, 10_000).await;
        assert_eq!(claimed.id, "healthy");
    }

    #[tokio::test]
    async fn test_fail_unreadable_counts_attempt_and_keeps_other_statuses() {
        let repo = setup_test_db().await;
        repo.insert(&post("planned", 1_000)).await.unwrap();
        let mut paused = post("paused", 2_000);
        paused.status = PostStatus::Paused;
        repo.insert(&paused).await.unwrap();

        repo.fail_unreadable(&"planned".to_string(), "unreadable row")
            .await
            .unwrap();
        repo.fail_unreadable(&"paused".to_string(), "unreadable row")
            .await
            .unwrap();

        let failed = repo.find_by_id(&"planned".to_string()).await.unwrap().unwrap();
        assert_eq!(failed.status, PostStatus::Failed);
        assert_eq!(failed.attempt, 1);
        assert_eq!(failed.error.as_deref(), Some("unreadable row"));

        let untouched = repo.find_by_id(&"paused".to_string()).await.unwrap().unwrap();
        assert_eq!(untouched.status, PostStatus::Paused);
        assert_eq!(untouched.attempt, 0);
    }
}
