//! Operator actions and crash recovery against the SQLite store

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::Harness;
use reelcast_core::application::{CycleOutcome, RecoveryService, ScheduleRequest};
use reelcast_core::domain::{PostStatus, PublishFailure};
use reelcast_core::port::media_platform::mocks::ScriptedPlatform;
use reelcast_core::port::time_provider::SystemTimeProvider;
use reelcast_core::port::{PostFilter, PostRepository};
use reelcast_core::AppError;
use reelcast_infra_sqlite::{create_pool, run_migrations, SqlitePostRepository};

#[tokio::test]
async fn test_paused_post_is_invisible_to_scheduler() {
    let harness = Harness::new().await;
    let post = harness.schedule("Launch day", &[]).await;
    let platform = Arc::new(ScriptedPlatform::ready());
    let scheduler = harness.scheduler(platform.clone());

    harness.posts.pause(&post.id).await.unwrap();
    assert_eq!(scheduler.process_next_post().await.unwrap(), CycleOutcome::Idle);
    assert!(platform.calls().is_empty());

    harness.posts.resume(&post.id).await.unwrap();
    assert!(matches!(
        scheduler.process_next_post().await.unwrap(),
        CycleOutcome::Published { .. }
    ));
}

#[tokio::test]
async fn test_requeue_after_failure_increments_attempt() {
    let harness = Harness::new().await;
    let post = harness.schedule("Launch day", &[]).await;

    let failing = Arc::new(
        ScriptedPlatform::ready().with_create(Err(PublishFailure::Transport(
            "connection reset by peer".to_string(),
        ))),
    );
    let outcome = harness
        .scheduler(failing)
        .process_next_post()
        .await
        .unwrap();
    assert!(matches!(outcome, CycleOutcome::Failed { kind: "transport", .. }));

    let requeued = harness.posts.requeue(&post.id).await.unwrap();
    assert_eq!(requeued.status, PostStatus::Planned);
    assert_eq!(requeued.attempt, 1);
    assert!(requeued.error.is_some());

    let outcome = harness
        .scheduler(Arc::new(ScriptedPlatform::ready()))
        .process_next_post()
        .await
        .unwrap();
    assert!(matches!(outcome, CycleOutcome::Published { .. }));

    let post = harness.posts.get(&post.id).await.unwrap();
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.attempt, 2);
    assert_eq!(post.error, None);
}

#[tokio::test]
async fn test_failed_posts_are_not_retried_automatically() {
    let harness = Harness::new().await;
    harness.schedule("Launch day", &[]).await;
    let platform = Arc::new(
        ScriptedPlatform::ready().with_publish(Err(PublishFailure::Protocol(
            "media not ready".to_string(),
        ))),
    );
    let scheduler = harness.scheduler(platform.clone());

    scheduler.process_next_post().await.unwrap();
    harness.clock.advance(Duration::from_secs(3600));

    assert_eq!(scheduler.process_next_post().await.unwrap(), CycleOutcome::Idle);
    assert_eq!(platform.count("create"), 1);
}

#[tokio::test]
async fn test_future_schedule_waits_for_its_time() {
    let harness = Harness::new().await;
    let at = common::START_MS + 60_000;
    harness
        .posts
        .schedule(ScheduleRequest {
            account_id: "acc-1".to_string(),
            media_id: "media-1".to_string(),
            caption: None,
            tags: vec!["later".to_string()],
            scheduled_at: Some(at),
            created_by: None,
        })
        .await
        .unwrap();
    let platform = Arc::new(ScriptedPlatform::ready());
    let scheduler = harness.scheduler(platform.clone());

    assert_eq!(scheduler.process_next_post().await.unwrap(), CycleOutcome::Idle);

    harness.clock.set(at);
    assert!(matches!(
        scheduler.process_next_post().await.unwrap(),
        CycleOutcome::Published { .. }
    ));
    assert_eq!(platform.requests()[0].caption, "#later");
}

#[tokio::test]
async fn test_schedule_rejects_unknown_media() {
    let harness = Harness::new().await;

    let err = harness
        .posts
        .schedule(ScheduleRequest {
            account_id: "acc-1".to_string(),
            media_id: "media-404".to_string(),
            caption: None,
            tags: Vec::new(),
            scheduled_at: None,
            created_by: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(harness.posts.list(&PostFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_status() {
    let harness = Harness::new().await;
    let first = harness.schedule("first", &[]).await;
    harness.clock.advance(Duration::from_secs(1));
    harness.schedule("second", &[]).await;
    harness.posts.pause(&first.id).await.unwrap();

    let paused = harness
        .posts
        .list(&PostFilter {
            status: Some(PostStatus::Paused),
            account_id: None,
        })
        .await
        .unwrap();

    assert_eq!(paused.len(), 1);
    assert_eq!(paused[0].id, first.id);
}

#[tokio::test]
async fn test_recovery_fails_interrupted_publish() {
    let harness = Harness::new().await;
    let post = harness.schedule("Launch day", &[]).await;

    // Simulate a crash after the PUBLISHING transition was persisted
    let mut interrupted = post.clone();
    interrupted.begin_publishing(common::START_MS).unwrap();
    harness.repo.save(&interrupted).await.unwrap();

    harness.clock.advance(Duration::from_secs(11 * 60));
    let recovery = RecoveryService::new(harness.repo.clone(), harness.clock.clone(), None);
    assert_eq!(recovery.recover_interrupted().await.unwrap(), 1);

    let post = harness.posts.get(&post.id).await.unwrap();
    assert_eq!(post.status, PostStatus::Failed);
    assert_eq!(post.attempt, 1);
    assert!(post.error.unwrap().contains("interrupted"));

    // Not picked up again without an operator requeue
    let scheduler = harness.scheduler(Arc::new(ScriptedPlatform::ready()));
    assert_eq!(scheduler.process_next_post().await.unwrap(), CycleOutcome::Idle);
}

#[tokio::test]
async fn test_posts_survive_restart() {
    let db_path = std::env::temp_dir().join(format!("reelcast_restart_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&db_path);
    let url = format!("sqlite://{}", db_path.display());

    {
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqlitePostRepository::new(pool.clone());
        let mut post = reelcast_core::domain::Post::new("post-1", 1_000, "acc-1", "media-1");
        post.tags = vec!["reels".to_string()];
        repo.insert(&post).await.unwrap();
        pool.close().await;
    }

    {
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqlitePostRepository::new(pool.clone()));

        let post = repo.find_by_id(&"post-1".to_string()).await.unwrap().unwrap();
        assert_eq!(post.status, PostStatus::Planned);
        assert_eq!(post.tags, vec!["reels".to_string()]);

        let recovery = RecoveryService::new(repo, Arc::new(SystemTimeProvider), None);
        assert_eq!(recovery.recover_interrupted().await.unwrap(), 0);
        pool.close().await;
    }

    let _ = std::fs::remove_file(&db_path);
}
