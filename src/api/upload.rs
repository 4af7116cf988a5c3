use super::{UPLOAD_PATH, network_error, read_json, with_deadline};
use crate::{Error, Result, config::ApiConfig};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Multipart field name the backend reads the document from.
pub const FILE_FIELD: &str = "file";

const UPLOAD_FAILED: &str = "Document upload failed. Please try again.";
const UPLOAD_TIMED_OUT: &str = "Upload timed out. Try a smaller file or better network.";
const UPLOAD_OK: &str = "Document uploaded successfully.";

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl DocumentFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            bytes,
            mime_type,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Reads a document from disk. A file over `max_bytes` is rejected from
    /// its metadata without being read.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::validation(format!("Not a file: {}", path.display())))?;

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::validation(format!("Not a file: {}", path.display())));
        }
        if metadata.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Backend response to a successful upload, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub body: Value,
    document_id: Option<String>,
}

impl UploadResult {
    pub fn new(body: Value, document_id_fields: &[String]) -> Self {
        let document_id = document_id_fields
            .iter()
            .find_map(|field| match body.get(field) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            });
        Self { body, document_id }
    }

    pub fn message(&self) -> &str {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UPLOAD_OK)
    }

    /// Identifier the backend assigned to the indexed document, if any.
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

pub struct UploadClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    max_bytes: u64,
    allowed_extensions: Vec<String>,
    document_id_fields: Vec<String>,
}

impl UploadClient {
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            url: config.endpoint(UPLOAD_PATH),
            timeout: Duration::from_millis(config.upload_timeout_ms),
            max_bytes: config.max_upload_bytes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            document_id_fields: config.document_id_fields.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn upload(&self, file: Option<DocumentFile>) -> Result<UploadResult> {
        let file = file.ok_or_else(|| Error::validation("No file selected"))?;
        self.validate(&file)?;

        debug!(
            "Uploading '{}' ({} bytes, {}) to {}",
            file.name,
            file.size(),
            file.mime_type,
            self.url
        );

        let name = file.name.clone();
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|e| Error::validation(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part(FILE_FIELD, part);

        let body = with_deadline(Some(self.timeout), UPLOAD_TIMED_OUT, async {
            let response = self
                .http
                .post(&self.url)
                .multipart(form)
                .send()
                .await
                .map_err(network_error)?;
            read_json(response, UPLOAD_FAILED).await
        })
        .await?;

        let result = UploadResult::new(body, &self.document_id_fields);
        info!(
            "Uploaded '{}' (document id: {})",
            name,
            result.document_id().unwrap_or("none")
        );
        Ok(result)
    }

    fn validate(&self, file: &DocumentFile) -> Result<()> {
        if file.bytes.is_empty() {
            return Err(Error::validation(format!("File '{}' is empty", file.name)));
        }

        if file.size() > self.max_bytes {
            return Err(too_large(self.max_bytes));
        }

        if !self.allowed_extensions.is_empty() {
            let ext = file.extension().unwrap_or_default();
            if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
                return Err(Error::validation(format!(
                    "Unsupported file type: .{}. Supported: {}",
                    ext,
                    self.allowed_extensions.join(", ")
                )));
            }
        }

        Ok(())
    }
}

fn too_large(max_bytes: u64) -> Error {
    Error::validation(format!("File too large (max {})", format_size(max_bytes)))
}

/// Human-readable size in the largest unit it reaches, truncated.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}
