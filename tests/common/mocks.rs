use async_trait::async_trait;
use rag_desk::{
    Error, KnowledgeApi, Result,
    api::{DocumentFile, HealthStatus, QueryResult, UploadResult},
    config::ApiConfig,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// A recorded `ask` call
#[derive(Debug, Clone, PartialEq)]
pub struct AskCall {
    pub question: String,
    pub document_id: Option<String>,
}

/// Mock knowledge backend for front-end tests
#[derive(Debug, Clone)]
pub struct MockKnowledgeApi {
    pub answers: Arc<Mutex<Vec<Result<QueryResult>>>>,
    pub calls: Arc<Mutex<Vec<AskCall>>>,
}

impl MockKnowledgeApi {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues replies; they are handed out in order.
    pub fn with_answers(self, answers: Vec<Result<QueryResult>>) -> Self {
        *self.answers.lock().unwrap() = answers;
        self
    }

    pub fn get_calls(&self) -> Vec<AskCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn answer(text: &str) -> Result<QueryResult> {
    Ok(QueryResult {
        answer: text.to_string(),
    })
}

#[async_trait]
impl KnowledgeApi for MockKnowledgeApi {
    async fn upload(&self, file: Option<DocumentFile>) -> Result<UploadResult> {
        let file = file.ok_or_else(|| Error::validation("No file selected"))?;
        Ok(UploadResult::new(
            json!({ "message": "ok", "filename": file.name, "document_id": "mock-doc" }),
            &ApiConfig::default().document_id_fields,
        ))
    }

    async fn ask(&self, question: &str, document_id: Option<&str>) -> Result<QueryResult> {
        self.calls.lock().unwrap().push(AskCall {
            question: question.to_string(),
            document_id: document_id.map(str::to_string),
        });

        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            return Err(Error::internal("No more mock answers"));
        }
        answers.remove(0)
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::from_body(json!({ "health": "healthy" })))
    }
}
