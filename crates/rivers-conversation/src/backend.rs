//! Completion backend abstraction

use async_trait::async_trait;
use rivers_types::{BackendError, ConversationTurn, Role};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionRole {
    System,
    User,
    Assistant,
}

impl From<Role> for CompletionRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => CompletionRole::User,
            Role::Assistant => CompletionRole::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionMessage {
    pub role: CompletionRole,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: CompletionRole::System,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for CompletionMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Outbound context for one completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Generates an assistant reply for a message list.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// `Ok(None)` means the call succeeded but produced no text.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, BackendError>;
}
