// Graph API MediaPlatform Implementation

use crate::config::GraphApiConfig;
use crate::response::{classify_status, extract_id, parse_body};
use async_trait::async_trait;
use reelcast_core::domain::{mask_secret, redact, AccountCredentials, PublishFailure};
use reelcast_core::error::{AppError, Result};
use reelcast_core::port::{ContainerRequest, ContainerStatus, MediaPlatform};
use tracing::debug;

const MEDIA_TYPE_REELS: &str = "REELS";
const STATUS_FIELDS: &str = "status_code,status";

/// Reels publishing over the Graph API container protocol
pub struct GraphApiClient {
    http: reqwest::Client,
    config: GraphApiConfig,
}

impl GraphApiClient {
    pub fn new(config: GraphApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reelcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Send a request and read the body, mapping network errors to transport failures
    async fn send(
        &self,
        context: &str,
        request: reqwest::RequestBuilder,
        access_token: &str,
    ) -> std::result::Result<serde_json::Value, PublishFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_failure(context, e, access_token))?;

        let http_status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_failure(context, e, access_token))?;

        parse_body(context, http_status, &body, access_token)
    }

    fn transport_failure(
        &self,
        context: &str,
        err: reqwest::Error,
        access_token: &str,
    ) -> PublishFailure {
        if err.is_timeout() {
            return PublishFailure::Transport(format!(
                "{} timed out after {}s",
                context,
                self.config.timeout.as_secs()
            ));
        }
        // The URL may carry the token as a query parameter
        let err = err.without_url();
        PublishFailure::Transport(format!(
            "{}: {}",
            context,
            redact(&err.to_string(), access_token)
        ))
    }
}

#[async_trait]
impl MediaPlatform for GraphApiClient {
    async fn create_container(
        &self,
        credentials: &AccountCredentials,
        request: &ContainerRequest,
    ) -> std::result::Result<String, PublishFailure> {
        let url = self
            .config
            .endpoint(&format!("{}/media", credentials.platform_user_id));
        debug!(
            platform_user_id = %credentials.platform_user_id,
            access_token = %mask_secret(&credentials.access_token),
            "Creating media container"
        );

        let form = [
            ("media_type", MEDIA_TYPE_REELS),
            ("video_url", request.video_url.as_str()),
            ("caption", request.caption.as_str()),
            ("access_token", credentials.access_token.as_str()),
        ];
        let body = self
            .send(
                "create container",
                self.http.post(url).form(&form),
                &credentials.access_token,
            )
            .await?;

        extract_id("create container", &body, &credentials.access_token)
    }

    async fn container_status(
        &self,
        credentials: &AccountCredentials,
        creation_id: &str,
    ) -> std::result::Result<ContainerStatus, PublishFailure> {
        let url = self.config.endpoint(creation_id);
        let query = [
            ("fields", STATUS_FIELDS),
            ("access_token", credentials.access_token.as_str()),
        ];
        let body = self
            .send(
                "container status",
                self.http.get(url).query(&query),
                &credentials.access_token,
            )
            .await?;

        let status = classify_status(&body, &credentials.access_token);
        debug!(creation_id = %creation_id, status = ?status, "Container status");
        Ok(status)
    }

    async fn publish_container(
        &self,
        credentials: &AccountCredentials,
        creation_id: &str,
    ) -> std::result::Result<String, PublishFailure> {
        let url = self
            .config
            .endpoint(&format!("{}/media_publish", credentials.platform_user_id));
        debug!(creation_id = %creation_id, "Publishing media container");

        let form = [
            ("creation_id", creation_id),
            ("access_token", credentials.access_token.as_str()),
        ];
        let body = self
            .send(
                "publish container",
                self.http.post(url).form(&form),
                &credentials.access_token,
            )
            .await?;

        extract_id("publish container", &body, &credentials.access_token)
    }
}
