// Graph API response classification
//
// Every string that leaves this module has the access token redacted.

use reelcast_core::domain::{redact, PublishFailure};
use reelcast_core::port::ContainerStatus;
use serde_json::Value;

const STATUS_FINISHED: &str = "FINISHED";
const STATUS_ERROR: &str = "ERROR";

/// Decode a response body
///
/// A body carrying `error` is a protocol failure whatever the HTTP status;
/// a body that is not a JSON object is a transport failure.
pub(crate) fn parse_body(
    context: &str,
    http_status: u16,
    body: &str,
    access_token: &str,
) -> Result<Value, PublishFailure> {
    let value: Value = serde_json::from_str(body).map_err(|_| {
        PublishFailure::Transport(format!(
            "{} returned a non-JSON body (HTTP {}): {}",
            context,
            http_status,
            redact(body, access_token)
        ))
    })?;

    if !value.is_object() {
        return Err(PublishFailure::Transport(format!(
            "{} returned an unexpected JSON body (HTTP {}): {}",
            context,
            http_status,
            redact(body, access_token)
        )));
    }

    if let Some(error) = value.get("error") {
        return Err(PublishFailure::Protocol(format!(
            "{}: {}",
            context,
            redact(&error.to_string(), access_token)
        )));
    }

    if !(200..300).contains(&http_status) {
        return Err(PublishFailure::Protocol(format!(
            "{} returned HTTP {}: {}",
            context,
            http_status,
            redact(body, access_token)
        )));
    }

    Ok(value)
}

/// Pull the non-empty `id` out of a create or publish response
pub(crate) fn extract_id(
    context: &str,
    value: &Value,
    access_token: &str,
) -> Result<String, PublishFailure> {
    let id = match value.get("id") {
        Some(Value::String(id)) => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    if id.is_empty() {
        return Err(PublishFailure::Protocol(format!(
            "{} response without id: {}",
            context,
            redact(&value.to_string(), access_token)
        )));
    }
    Ok(id)
}

/// Classify a container status response
pub(crate) fn classify_status(value: &Value, access_token: &str) -> ContainerStatus {
    let status_code = value.get("status_code").and_then(Value::as_str);

    match status_code {
        Some(STATUS_FINISHED) => ContainerStatus::Ready,
        Some(STATUS_ERROR) => ContainerStatus::Errored {
            diagnostic: redact(&value.to_string(), access_token),
        },
        other => ContainerStatus::Processing {
            status: other
                .or_else(|| value.get("status").and_then(Value::as_str))
                .map(str::to_string),
        },
    }
}
