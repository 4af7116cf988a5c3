use super::{HEALTH_PATH, network_error, read_json, with_deadline};
use crate::{Result, config::ApiConfig};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const HEALTH_FAILED: &str = "Backend health check failed.";
const HEALTH_TIMED_OUT: &str = "Health check timed out.";

#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub body: Value,
}

impl HealthStatus {
    pub fn from_body(body: Value) -> Self {
        let healthy = ["health", "status"].iter().any(|field| {
            matches!(
                body.get(*field).and_then(Value::as_str),
                Some("healthy") | Some("ok")
            )
        });
        Self { healthy, body }
    }
}

pub struct HealthClient {
    http: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl HealthClient {
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            url: config.endpoint(HEALTH_PATH),
            timeout: config.query_timeout_ms.map(Duration::from_millis),
        }
    }

    pub async fn check(&self) -> Result<HealthStatus> {
        debug!("Checking backend health at {}", self.url);

        let body = with_deadline(self.timeout, HEALTH_TIMED_OUT, async {
            let response = self.http.get(&self.url).send().await.map_err(network_error)?;
            read_json(response, HEALTH_FAILED).await
        })
        .await?;

        Ok(HealthStatus::from_body(body))
    }
}
