//! Conversation transcript kept by interactive front ends.

use crate::client::KnowledgeApi;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), false)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into(), false)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into(), true)
    }

    fn new(role: Role, text: String, is_error: bool) -> Self {
        Self {
            role,
            text,
            is_error,
            created_at: Utc::now(),
        }
    }
}

pub struct ChatSession<A: KnowledgeApi> {
    api: A,
    document_id: Option<String>,
    turns: Vec<Turn>,
}

impl<A: KnowledgeApi> ChatSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            document_id: None,
            turns: Vec::new(),
        }
    }

    /// Pins every question of this session to one document.
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Asks one question and records both sides of the exchange.
    ///
    /// Blank input is ignored and returns `None`. A failed request is recorded
    /// as an assistant turn flagged `is_error` carrying the error message.
    pub async fn send(&mut self, input: &str) -> Option<&Turn> {
        if input.trim().is_empty() {
            return None;
        }

        self.turns.push(Turn::user(input));

        let reply = match self.api.ask(input, self.document_id.as_deref()).await {
            Ok(result) => {
                info!("Chat turn {} answered", self.turns.len());
                Turn::assistant(result.answer)
            }
            Err(e) => {
                error!(kind = e.kind(), "Chat turn failed: {}", e);
                Turn::failure(e.to_string())
            }
        };

        self.turns.push(reply);
        self.turns.last()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
