use super::{CHAT_PATH, network_error, read_json, with_deadline};
use crate::{
    Error, Result,
    config::{ApiConfig, DocumentScope},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const QUERY_FAILED: &str = "Failed to get AI response. Please try again.";
const QUERY_TIMED_OUT: &str = "Query timed out. Please try again.";
const BLANK_QUESTION: &str = "Please enter a question";
const NO_DOCUMENT: &str = "No document uploaded yet. Please upload a document first.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
}

/// Picks the answer out of a response body: the first of `fields` holding a
/// string, otherwise the whole body as compact JSON.
pub fn extract_answer(body: &Value, fields: &[String]) -> String {
    fields
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

pub struct QueryClient {
    http: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
    answer_fields: Vec<String>,
    scope: DocumentScope,
}

impl QueryClient {
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            url: config.endpoint(CHAT_PATH),
            timeout: config.query_timeout_ms.map(Duration::from_millis),
            answer_fields: config.answer_fields.clone(),
            scope: config.document_scope,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Validates the question and applies the document scope policy.
    pub fn build_request(&self, question: &str, document_id: Option<&str>) -> Result<QueryRequest> {
        let query = question.trim();
        if query.is_empty() {
            return Err(Error::validation(BLANK_QUESTION));
        }

        let document_id = document_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let document_id = match self.scope {
            DocumentScope::Never => None,
            DocumentScope::IfAvailable => document_id,
            DocumentScope::Required => Some(document_id.ok_or_else(|| Error::validation(NO_DOCUMENT))?),
        };

        Ok(QueryRequest {
            query: query.to_string(),
            document_id,
        })
    }

    pub async fn ask(&self, question: &str, document_id: Option<&str>) -> Result<QueryResult> {
        let request = self.build_request(question, document_id)?;

        debug!(
            "Sending query ({} chars, document: {}) to {}",
            request.query.len(),
            request.document_id.as_deref().unwrap_or("none"),
            self.url
        );

        let body = with_deadline(self.timeout, QUERY_TIMED_OUT, async {
            let response = self
                .http
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(network_error)?;
            read_json(response, QUERY_FAILED).await
        })
        .await?;

        let answer = extract_answer(&body, &self.answer_fields);
        info!("Received answer ({} chars)", answer.len());
        Ok(QueryResult { answer })
    }
}
