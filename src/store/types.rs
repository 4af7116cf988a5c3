use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recently uploaded document, remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "latest_document_id")]
    pub document_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn new(document_id: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            document_id: document_id.into(),
            filename,
            uploaded_at: Utc::now(),
        }
    }
}
