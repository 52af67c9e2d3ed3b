// Reelcast Infrastructure - Graph API Adapter
// Implements: MediaPlatform, MediaUrlResolver

mod client;
mod config;
mod media_url;
mod response;

pub use client::GraphApiClient;
pub use config::{GraphApiConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT};
pub use media_url::PublicBaseUrlResolver;
