mod health;
mod query;
mod upload;

pub use health::{HealthClient, HealthStatus};
pub use query::{QueryClient, QueryRequest, QueryResult, extract_answer};
pub use upload::{DocumentFile, UploadClient, UploadResult};

use crate::{Error, Result};
use serde_json::Value;
use std::{future::Future, time::Duration};

pub const UPLOAD_PATH: &str = "documents/upload";
pub const CHAT_PATH: &str = "chat";
pub const HEALTH_PATH: &str = "health";

/// Builds the HTTP client shared by every endpoint client.
pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ragdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))
}

/// Turns a failed response body into a human-readable message.
///
/// Prefers a structured `detail` string, then the list of `msg` entries that
/// request-validation failures carry under `detail`, then the raw body text,
/// then `fallback`.
pub fn normalize_error_message(body: &str, fallback: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => {
                return detail.clone();
            }
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn network_error(e: reqwest::Error) -> Error {
    Error::network(format!("Could not reach the backend: {}", e))
}

/// Runs one round trip under an optional deadline. On expiry the future is
/// dropped, which aborts the in-flight request.
pub(crate) async fn with_deadline<T, F>(limit: Option<Duration>, message: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::timeout(message))?,
        None => fut.await,
    }
}

/// Reads the whole response and decodes a success body as JSON, or raises a
/// backend error carrying the normalized failure message.
pub(crate) async fn read_json(response: reqwest::Response, fallback: &str) -> Result<Value> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;

    if !status.is_success() {
        return Err(Error::backend(
            status.as_u16(),
            normalize_error_message(&body, fallback),
        ));
    }

    serde_json::from_str(&body).map_err(|_| {
        Error::backend(status.as_u16(), "Backend returned an invalid response")
    })
}
