use crate::{
    Result,
    api::{
        DocumentFile, HealthClient, HealthStatus, QueryClient, QueryResult, UploadClient,
        UploadResult, build_http_client,
    },
    config::ApiConfig,
    store::{DocumentStore, StoredDocument},
};
use async_trait::async_trait;
use tracing::warn;

/// Operations a front end performs against the knowledge backend.
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
    async fn upload(&self, file: Option<DocumentFile>) -> Result<UploadResult>;
    async fn ask(&self, question: &str, document_id: Option<&str>) -> Result<QueryResult>;
    async fn health(&self) -> Result<HealthStatus>;
}

pub struct KnowledgeClient {
    upload: UploadClient,
    query: QueryClient,
    health: HealthClient,
    store: DocumentStore,
}

impl KnowledgeClient {
    pub fn new(config: &ApiConfig, store: DocumentStore) -> Result<Self> {
        let http = build_http_client()?;

        Ok(Self {
            upload: UploadClient::new(http.clone(), config),
            query: QueryClient::new(http.clone(), config),
            health: HealthClient::new(http, config),
            store,
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Id sent with a query: the explicit one, else the last uploaded one.
    async fn resolve_document_id(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
            return Some(id.to_string());
        }

        match self.store.latest().await {
            Ok(stored) => stored.map(|doc| doc.document_id),
            Err(e) => {
                warn!("Could not read the latest document id: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl KnowledgeApi for KnowledgeClient {
    async fn upload(&self, file: Option<DocumentFile>) -> Result<UploadResult> {
        let filename = file.as_ref().map(|f| f.name.clone());
        let result = self.upload.upload(file).await?;

        if let Some(id) = result.document_id() {
            // Remembering the id is best effort; the upload itself succeeded.
            if let Err(e) = self.store.remember(StoredDocument::new(id, filename)).await {
                warn!("Failed to remember document id {}: {}", id, e);
            }
        } else {
            // The stored id must always name the latest upload.
            warn!("Upload response carried no document id, forgetting the previous one");
            if let Err(e) = self.store.forget().await {
                warn!("Failed to forget the previous document id: {}", e);
            }
        }

        Ok(result)
    }

    async fn ask(&self, question: &str, document_id: Option<&str>) -> Result<QueryResult> {
        let document_id = self.resolve_document_id(document_id).await;
        self.query.ask(question, document_id.as_deref()).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.health.check().await
    }
}
