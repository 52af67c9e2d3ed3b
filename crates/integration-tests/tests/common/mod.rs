//! Shared fixtures: in-memory SQLite, seeded catalog, manual clock

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use reelcast_core::application::{
    ContainerPublisher, PollSettings, PostService, ScheduleRequest, Scheduler,
};
use reelcast_core::domain::{Account, Media, Post};
use reelcast_core::port::id_provider::mocks::SequentialIdProvider;
use reelcast_core::port::time_provider::mocks::ManualClock;
use reelcast_core::port::{CatalogRepository, MediaPlatform};
use reelcast_infra_graph::{GraphApiClient, GraphApiConfig, PublicBaseUrlResolver};
use reelcast_infra_sqlite::{create_pool, run_migrations, SqlitePostRepository};
use sqlx::SqlitePool;

pub const USER: &str = "17841400000000000";
pub const TOKEN: &str = "EAABsbCS1iHgBAKZBZC0token9xyz";
pub const START_MS: i64 = 1_700_000_000_000;
pub const PUBLIC_BASE_URL: &str = "https://reels.example.com";

pub struct Harness {
    pub pool: SqlitePool,
    pub repo: Arc<SqlitePostRepository>,
    pub clock: Arc<ManualClock>,
    pub posts: PostService,
}

impl Harness {
    pub async fn new() -> Self {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let repo = Arc::new(SqlitePostRepository::new(pool.clone()));
        repo.insert_account(&account()).await.unwrap();
        repo.insert_media(&media()).await.unwrap();

        let clock = Arc::new(ManualClock::new(START_MS));
        let posts = PostService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(SequentialIdProvider::new("post")),
            clock.clone(),
        );

        Self {
            pool,
            repo,
            clock,
            posts,
        }
    }

    pub fn scheduler(&self, platform: Arc<dyn MediaPlatform>) -> Scheduler {
        let publisher = Arc::new(ContainerPublisher::new(
            platform,
            self.clock.clone(),
            PollSettings::default(),
        ));
        Scheduler::new(
            self.repo.clone(),
            self.repo.clone(),
            publisher,
            Arc::new(PublicBaseUrlResolver::new(PUBLIC_BASE_URL)),
            self.clock.clone(),
            Duration::from_millis(10),
        )
    }

    /// Schedule a due post for the seeded account
    pub async fn schedule(&self, caption: &str, tags: &[&str]) -> Post {
        self.posts
            .schedule(ScheduleRequest {
                account_id: "acc-1".to_string(),
                media_id: "media-1".to_string(),
                caption: Some(caption.to_string()),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                scheduled_at: None,
                created_by: Some("user-1".to_string()),
            })
            .await
            .unwrap()
    }
}

pub fn graph_platform(base_url: String) -> Arc<GraphApiClient> {
    Arc::new(
        GraphApiClient::new(GraphApiConfig {
            base_url,
            api_version: "v21.0".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    )
}

pub fn account() -> Account {
    Account {
        id: "acc-1".to_string(),
        name: "Brand".to_string(),
        platform_user_id: USER.to_string(),
        access_token: TOKEN.to_string(),
        token_expires_at: None,
        created_at: 0,
    }
}

pub fn media() -> Media {
    Media {
        id: "media-1".to_string(),
        account_id: "acc-1".to_string(),
        storage_key: "reels/launch.mp4".to_string(),
        filename: "launch.mp4".to_string(),
        mime: "video/mp4".to_string(),
        size_bytes: 10_485_760,
        created_at: 0,
    }
}
