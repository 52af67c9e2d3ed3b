//! Container publisher - the three-phase publish protocol
//!
//! 1. create a media container from a public video URL
//! 2. poll the container until the platform finished processing it
//! 3. publish the container
//!
//! Phases run strictly in order and phase 3 runs at most once per attempt.
//! Every failure comes back as a classified `PublishFailure`.

pub mod constants;
mod readiness;

pub use readiness::{PollSettings, PollStep, ReadinessPoll};

use crate::domain::{compose_caption, mask_secret, AccountCredentials, PublishFailure};
use crate::port::{ContainerRequest, MediaPlatform, PublishRequest, Publisher, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// `Publisher` backed by a container-based media platform
pub struct ContainerPublisher {
    platform: Arc<dyn MediaPlatform>,
    time_provider: Arc<dyn TimeProvider>,
    settings: PollSettings,
}

impl ContainerPublisher {
    pub fn new(
        platform: Arc<dyn MediaPlatform>,
        time_provider: Arc<dyn TimeProvider>,
        settings: PollSettings,
    ) -> Self {
        Self {
            platform,
            time_provider,
            settings,
        }
    }

    /// Phase 2: poll until the container is ready, errored, or out of time
    async fn wait_until_ready(
        &self,
        credentials: &AccountCredentials,
        creation_id: &str,
    ) -> Result<(), PublishFailure> {
        let mut poll = ReadinessPoll::new(
            creation_id,
            self.time_provider.now_millis(),
            self.settings,
        );

        loop {
            let now = self.time_provider.now_millis();
            if !poll.may_poll(now) {
                let failure = poll.timeout(now);
                warn!(
                    creation_id = %creation_id,
                    polls = poll.polls(),
                    last_status = ?poll.last_status(),
                    "Container readiness timed out"
                );
                return Err(failure);
            }

            let status = self
                .platform
                .container_status(credentials, creation_id)
                .await?;

            match poll.observe(status) {
                PollStep::Ready => {
                    debug!(creation_id = %creation_id, polls = poll.polls(), "Container ready");
                    return Ok(());
                }
                PollStep::Failed(failure) => return Err(failure),
                PollStep::Wait(delay) => {
                    debug!(
                        creation_id = %creation_id,
                        status = ?poll.last_status(),
                        delay_ms = delay.as_millis() as u64,
                        "Container still processing"
                    );
                    self.time_provider.sleep(delay).await;
                }
            }
        }
    }
}

fn validate(request: &PublishRequest) -> Result<(), PublishFailure> {
    if request.credentials.platform_user_id.trim().is_empty() {
        return Err(PublishFailure::Validation(
            "account has no platform user id".to_string(),
        ));
    }
    if request.credentials.access_token.trim().is_empty() {
        return Err(PublishFailure::Validation(
            "account has no access token".to_string(),
        ));
    }
    if request.media_url.trim().is_empty() {
        return Err(PublishFailure::Validation(
            "media has no public url".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl Publisher for ContainerPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<String, PublishFailure> {
        validate(&request)?;

        let credentials = &request.credentials;
        let container = ContainerRequest {
            video_url: request.media_url.clone(),
            caption: compose_caption(request.caption.as_deref(), &request.tags),
        };

        info!(
            platform_user_id = %credentials.platform_user_id,
            access_token = %mask_secret(&credentials.access_token),
            video_url = %container.video_url,
            "Creating media container"
        );
        let creation_id = self
            .platform
            .create_container(credentials, &container)
            .await?;
        if creation_id.trim().is_empty() {
            return Err(PublishFailure::Protocol(
                "media container created without id".to_string(),
            ));
        }

        self.wait_until_ready(credentials, &creation_id).await?;

        info!(creation_id = %creation_id, "Publishing media container");
        let external_id = self
            .platform
            .publish_container(credentials, &creation_id)
            .await?;
        if external_id.trim().is_empty() {
            return Err(PublishFailure::Protocol(format!(
                "publish response for container {} without id",
                creation_id
            )));
        }

        Ok(external_id)
    }
}
