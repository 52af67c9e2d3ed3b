// Public media URL resolver

use reelcast_core::domain::{Media, PublishFailure};
use reelcast_core::port::MediaUrlResolver;

/// Resolves media to `{public_base_url}/media/files/{media_id}`
#[derive(Debug, Clone)]
pub struct PublicBaseUrlResolver {
    public_base_url: String,
}

impl PublicBaseUrlResolver {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl MediaUrlResolver for PublicBaseUrlResolver {
    fn resolve(&self, media: &Media) -> Result<String, PublishFailure> {
        if self.public_base_url.trim().is_empty() {
            return Err(PublishFailure::Validation(
                "public base url is not configured".to_string(),
            ));
        }
        Ok(format!("{}/media/files/{}", self.public_base_url, media.id))
    }
}
