// External Publisher Port
// Runs one full publish attempt and returns the platform's id for the post.

use crate::domain::{AccountCredentials, PublishFailure};
use async_trait::async_trait;

/// Everything one attempt needs, fetched once and passed by value
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub credentials: AccountCredentials,
    pub media_url: String,
    pub caption: Option<String>,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish the media, returns the external identifier on success
    async fn publish(&self, request: PublishRequest) -> Result<String, PublishFailure>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock publisher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Succeed with this external id
        Success(String),
        /// Fail with this failure
        Fail(PublishFailure),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Publisher for testing
    pub struct MockPublisher {
        behavior: Arc<Mutex<MockBehavior>>,
        requests: Arc<Mutex<Vec<PublishRequest>>>,
    }

    impl MockPublisher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success(external_id: impl Into<String>) -> Self {
            Self::new(MockBehavior::Success(external_id.into()))
        }

        pub fn new_fail(failure: PublishFailure) -> Self {
            Self::new(MockBehavior::Fail(failure))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<PublishRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        async fn publish(&self, request: PublishRequest) -> Result<String, PublishFailure> {
            self.requests.lock().unwrap().push(request);

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Success(id) => Ok(id),
                MockBehavior::Fail(failure) => Err(failure),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
