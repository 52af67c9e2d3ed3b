// Media Platform Port
// The three calls of the container publish protocol, one method per call.

use crate::domain::{AccountCredentials, PublishFailure};
use async_trait::async_trait;

/// Container creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRequest {
    pub video_url: String,
    pub caption: String,
}

/// Classified result of one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    /// Container finished processing and can be published
    Ready,
    /// Container processing failed permanently; `diagnostic` keeps the raw payload
    Errored { diagnostic: String },
    /// Still processing, or a status value we do not recognise
    Processing { status: Option<String> },
}

#[async_trait]
pub trait MediaPlatform: Send + Sync {
    /// Create a media container, returns its creation id
    async fn create_container(
        &self,
        credentials: &AccountCredentials,
        request: &ContainerRequest,
    ) -> Result<String, PublishFailure>;

    /// Query container processing status
    async fn container_status(
        &self,
        credentials: &AccountCredentials,
        creation_id: &str,
    ) -> Result<ContainerStatus, PublishFailure>;

    /// Publish a ready container, returns the final external id
    async fn publish_container(
        &self,
        credentials: &AccountCredentials,
        creation_id: &str,
    ) -> Result<String, PublishFailure>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted platform: replays queued responses and counts calls
    ///
    /// When the status script runs dry the last status is repeated.
    pub struct ScriptedPlatform {
        create: Mutex<Result<String, PublishFailure>>,
        statuses: Mutex<VecDeque<Result<ContainerStatus, PublishFailure>>>,
        last_status: Mutex<Result<ContainerStatus, PublishFailure>>,
        publish: Mutex<Result<String, PublishFailure>>,
        calls: Mutex<Vec<String>>,
        requests: Mutex<Vec<ContainerRequest>>,
    }

    impl ScriptedPlatform {
        pub fn new(statuses: Vec<ContainerStatus>) -> Self {
            Self {
                create: Mutex::new(Ok("creation-1".to_string())),
                statuses: Mutex::new(statuses.into_iter().map(Ok).collect()),
                last_status: Mutex::new(Ok(ContainerStatus::Processing { status: None })),
                publish: Mutex::new(Ok("media-9001".to_string())),
                calls: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn ready() -> Self {
            Self::new(vec![ContainerStatus::Ready])
        }

        pub fn with_create(self, result: Result<String, PublishFailure>) -> Self {
            *self.create.lock().unwrap() = result;
            self
        }

        pub fn with_status_error(self, failure: PublishFailure) -> Self {
            self.statuses.lock().unwrap().push_back(Err(failure));
            self
        }

        pub fn with_publish(self, result: Result<String, PublishFailure>) -> Self {
            *self.publish.lock().unwrap() = result;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
        }

        pub fn requests(&self) -> Vec<ContainerRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl MediaPlatform for ScriptedPlatform {
        async fn create_container(
            &self,
            _credentials: &AccountCredentials,
            request: &ContainerRequest,
        ) -> Result<String, PublishFailure> {
            self.record("create");
            self.requests.lock().unwrap().push(request.clone());
            self.create.lock().unwrap().clone()
        }

        async fn container_status(
            &self,
            _credentials: &AccountCredentials,
            _creation_id: &str,
        ) -> Result<ContainerStatus, PublishFailure> {
            self.record("status");
            let next = self.statuses.lock().unwrap().pop_front();
            match next {
                Some(result) => {
                    *self.last_status.lock().unwrap() = result.clone();
                    result
                }
                None => self.last_status.lock().unwrap().clone(),
            }
        }

        async fn publish_container(
            &self,
            _credentials: &AccountCredentials,
            _creation_id: &str,
        ) -> Result<String, PublishFailure> {
            self.record("publish");
            self.publish.lock().unwrap().clone()
        }
    }
}
