// Public URL resolver port
//
// The platform pulls media by URL, so every stored asset must map to an
// address reachable from outside.

use crate::domain::{Media, PublishFailure};

pub trait MediaUrlResolver: Send + Sync {
    /// Resolve a stored media asset to a publicly reachable URL
    fn resolve(&self, media: &Media) -> Result<String, PublishFailure>;
}
