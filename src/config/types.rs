use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upload_timeout_ms")]
    pub upload_timeout_ms: u64,
    /// No timeout on queries when unset.
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,
    /// Response fields tried in order when extracting an answer.
    #[serde(default = "default_answer_fields")]
    pub answer_fields: Vec<String>,
    /// Upload response fields tried in order when extracting a document id.
    #[serde(default = "default_document_id_fields")]
    pub document_id_fields: Vec<String>,
    #[serde(default)]
    pub document_scope: DocumentScope,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Empty accepts any extension.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Whether queries carry the id of a previously uploaded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentScope {
    Never,
    #[default]
    IfAvailable,
    Required,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ApiConfig {
    /// Base URL with trailing slashes removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_timeout_ms: default_upload_timeout_ms(),
            query_timeout_ms: None,
            answer_fields: default_answer_fields(),
            document_id_fields: default_document_id_fields(),
            document_scope: DocumentScope::default(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_upload_timeout_ms() -> u64 {
    120_000
}

fn default_answer_fields() -> Vec<String> {
    ["answer", "response", "message"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_document_id_fields() -> Vec<String> {
    ["document_id", "id", "doc_id"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "txt", "md", "html", "htm",
        "jpg", "jpeg", "png", "tiff",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_state_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ragdesk")
        .join("state.json")
}

fn default_log_level() -> String {
    "info".to_string()
}
