//! Reelcast - Main Entry Point
//! Scheduled Reels publisher: SQLite store + Graph API + single scheduler task

mod settings;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::Settings;
use reelcast_core::application::{shutdown_channel, ContainerPublisher, RecoveryService, Scheduler};
use reelcast_core::port::time_provider::SystemTimeProvider;
use reelcast_infra_graph::{GraphApiClient, PublicBaseUrlResolver};
use reelcast_infra_sqlite::{create_pool, run_migrations, SqlitePostRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (guard flushes the file writer on exit)
    let _log_guard = init_logging()?;

    info!("Reelcast v{} starting...", VERSION);

    // 2. Load configuration
    let settings = Settings::load()?;
    let database_url = settings.database_url();
    info!(
        database_url = %database_url,
        graph_base_url = %settings.graph_base_url,
        graph_api_version = %settings.graph_api_version,
        "Configuration loaded"
    );

    // 3. Initialize database
    ensure_db_dir(&database_url)?;
    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let repo = Arc::new(SqlitePostRepository::new(pool.clone()));
    let platform = Arc::new(
        GraphApiClient::new(settings.graph_api())
            .map_err(|e| anyhow::anyhow!("HTTP client setup failed: {}", e))?,
    );
    let publisher = Arc::new(ContainerPublisher::new(
        platform,
        time_provider.clone(),
        settings.poll_settings(),
    ));
    let url_resolver = Arc::new(PublicBaseUrlResolver::new(settings.public_base_url.clone()));

    // 5. Run crash recovery
    info!("Running crash recovery...");
    let recovery_service = RecoveryService::new(repo.clone(), time_provider.clone(), None);
    match recovery_service.recover_interrupted().await {
        Ok(count) => info!(recovered_posts = count, "Crash recovery completed"),
        Err(e) => tracing::error!(error = ?e, "Crash recovery failed"),
    }

    // 6. Start scheduler
    info!("Starting scheduler...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let scheduler = Scheduler::new(
        repo.clone(),
        repo,
        publisher,
        url_resolver,
        time_provider,
        settings.tick_interval(),
    );

    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown; an in-flight publish left behind is failed by
    // recovery on the next start
    shutdown_tx.shutdown();
    if tokio::time::timeout(SHUTDOWN_GRACE, scheduler_handle).await.is_err() {
        tracing::warn!("Scheduler did not stop in time, abandoning in-flight publish");
    }
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}

/// Console logging (pretty or JSON) plus an optional daily-rolling JSON file
///
/// Environment: `RUST_LOG` (default `reelcast=info`), `REELCAST_LOG_FORMAT`
/// (`pretty` | `json`), `REELCAST_LOG_DIR`.
fn init_logging() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var("REELCAST_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("reelcast=info"))?;

    let (file_layer, guard) = match std::env::var("REELCAST_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "reelcast.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(guard)
}

/// Create the parent directory of a file-backed SQLite database
fn ensure_db_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path.contains(":memory:") {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
