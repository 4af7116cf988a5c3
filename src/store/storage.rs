use super::StoredDocument;
use crate::{Error, Result};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{debug, info, warn};

pub struct DocumentStore {
    path: Option<PathBuf>,
    // In-memory fallback storage
    fallback: Arc<Mutex<Fallback>>,
}

#[derive(Default)]
struct Fallback {
    document: Option<StoredDocument>,
    // Set when a write missed the file; the file is stale until the next
    // successful write.
    newer_than_file: bool,
}

impl DocumentStore {
    /// Opens a file-backed store, falling back to memory when the state
    /// directory cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::in_memory();

        match Self::prepare(&path).await {
            Ok(()) => {
                info!("Document store ready: {}", path.display());
                store.path = Some(path);
            }
            Err(e) => {
                warn!(
                    "Document store unavailable at {}, using in-memory fallback: {}",
                    path.display(),
                    e
                );
            }
        }

        Ok(store)
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            fallback: Arc::new(Mutex::new(Fallback::default())),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    async fn prepare(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    pub async fn latest(&self) -> Result<Option<StoredDocument>> {
        if let Some(document) = self.read_newer_fallback()? {
            return Ok(document);
        }

        if let Some(ref path) = self.path {
            match read_file(path).await {
                Ok(document) => return Ok(document),
                Err(e) => {
                    warn!("Failed to read document store, using fallback: {}", e);
                }
            }
        }

        self.read_fallback()
    }

    pub async fn remember(&self, document: StoredDocument) -> Result<()> {
        if let Some(ref path) = self.path {
            match write_file(path, &document).await {
                Ok(()) => {
                    debug!("Stored latest document id: {}", document.document_id);
                    return self.write_fallback(Some(document), false);
                }
                Err(e) => {
                    warn!("Failed to write document store, using fallback: {}", e);
                    return self.write_fallback(Some(document), true);
                }
            }
        }

        self.write_fallback(Some(document), false)
    }

    pub async fn forget(&self) -> Result<()> {
        if let Some(ref path) = self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => debug!("Removed document store file: {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.write_fallback(None, false)
    }

    /// The in-memory copy, when a failed write left the file behind it.
    fn read_newer_fallback(&self) -> Result<Option<Option<StoredDocument>>> {
        let fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
        Ok(fallback
            .newer_than_file
            .then(|| fallback.document.clone()))
    }

    fn read_fallback(&self) -> Result<Option<StoredDocument>> {
        let fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
        Ok(fallback.document.clone())
    }

    fn write_fallback(&self, document: Option<StoredDocument>, newer_than_file: bool) -> Result<()> {
        let mut fallback = self
            .fallback
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
        fallback.document = document;
        fallback.newer_than_file = newer_than_file;
        Ok(())
    }
}

async fn read_file(path: &Path) -> Result<Option<StoredDocument>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_str(&contents) {
        Ok(document) => Ok(Some(document)),
        Err(e) => {
            warn!("Ignoring corrupt document store {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

async fn write_file(path: &Path, document: &StoredDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    // Whole-file replace so a crash never leaves a half-written state file.
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
