// Reelcast Infrastructure - SQLite Adapter
// Implements: PostRepository, CatalogRepository

mod connection;
mod error;
mod migration;
mod post_repository;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use post_repository::SqlitePostRepository;

// Note: sqlx::Error conversion is handled by a helper function
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
