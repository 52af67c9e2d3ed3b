// Port Layer - Interfaces for external dependencies

pub mod catalog_repository;
pub mod id_provider; // For deterministic testing
pub mod media_platform;
pub mod media_url;
pub mod post_repository;
pub mod publisher;
pub mod time_provider;

// Re-exports
pub use catalog_repository::CatalogRepository;
pub use id_provider::IdProvider;
pub use media_platform::{ContainerRequest, ContainerStatus, MediaPlatform};
pub use media_url::MediaUrlResolver;
pub use post_repository::{ClaimedPost, PostFilter, PostRepository};
pub use publisher::{PublishRequest, Publisher};
pub use time_provider::TimeProvider;
