use rag_desk::{
    KnowledgeClient,
    api::DocumentFile,
    config::{ApiConfig, DocumentScope},
    store::DocumentStore,
};
use serde_json::Value;
use tempfile::TempDir;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

/// API configuration pointing at a mock backend
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    }
}

pub fn api_config_with_scope(server: &MockServer, scope: DocumentScope) -> ApiConfig {
    ApiConfig {
        document_scope: scope,
        ..api_config(server)
    }
}

/// Client backed by an in-memory document store
pub fn create_client(config: &ApiConfig) -> KnowledgeClient {
    KnowledgeClient::new(config, DocumentStore::in_memory()).expect("Failed to build client")
}

/// Client backed by a file store inside a fresh temp directory
pub async fn create_client_with_file_store(config: &ApiConfig) -> (TempDir, KnowledgeClient) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = DocumentStore::open(temp_dir.path().join("state.json"))
        .await
        .expect("Failed to open store");
    let client = KnowledgeClient::new(config, store).expect("Failed to build client");
    (temp_dir, client)
}

pub fn sample_file() -> DocumentFile {
    DocumentFile::new("handbook.txt", b"Vacation policy: 25 days per year.".to_vec())
}

/// Number of requests the mock backend has seen
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

pub async fn last_json_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests.last().expect("no request received");
    serde_json::from_slice(&request.body).expect("request body is not JSON")
}

/// Answers every chat request with its own `query` field.
pub struct EchoQuery;

impl Respond for EchoQuery {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let query = body.get("query").cloned().unwrap_or(Value::Null);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "answer": query }))
    }
}
