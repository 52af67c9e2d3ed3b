// Domain Layer - Pure business logic and entities

pub mod caption;
pub mod catalog;
pub mod error;
pub mod failure;
pub mod post;
pub mod secret;

// Re-exports
pub use caption::compose_caption;
pub use catalog::{Account, AccountCredentials, Media};
pub use error::DomainError;
pub use failure::PublishFailure;
pub use post::{Post, PostId, PostStatus};
pub use secret::{mask_secret, redact};
