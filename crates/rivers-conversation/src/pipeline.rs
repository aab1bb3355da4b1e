//! Per-turn orchestration: parse, moderate, window, complete

use crate::backend::{CompletionBackend, CompletionMessage, CompletionRequest};
use crate::error::PipelineError;
use crate::persona::PERSONA_PROMPT;
use rivers_moderation::{route_on_flag, ModerationFilter};
use rivers_types::{ChatReply, ConversationTurn, Role};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Most recent turns forwarded as backend context.
pub const CONTEXT_WINDOW: usize = 20;
pub const TEMPERATURE: f64 = 0.9;
pub const MAX_OUTPUT_TOKENS: u32 = 500;
pub const DEFAULT_COMPLETION_MODEL: &str = "grok-beta";

/// Reply used when the backend answers without usable text.
pub const FALLBACK_REPLY: &str = "Oops, my brain did a thing! 😅 Can you say that again, babe?";

/// Extract the conversation history from a raw `/chat` request body.
pub fn parse_turns(body: &[u8]) -> Result<Vec<ConversationTurn>, PipelineError> {
    let body: Value = serde_json::from_slice(body).map_err(|_| PipelineError::InvalidBody)?;

    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .ok_or(PipelineError::MissingMessages)?;

    messages
        .iter()
        .map(|message| {
            serde_json::from_value(message.clone()).map_err(|_| PipelineError::InvalidMessage)
        })
        .collect()
}

/// Stateless chat-turn pipeline.
#[derive(Clone)]
pub struct ConversationPipeline {
    moderation: ModerationFilter,
    completion: Arc<dyn CompletionBackend>,
    model: String,
}

impl ConversationPipeline {
    pub fn new(moderation: ModerationFilter, completion: Arc<dyn CompletionBackend>) -> Self {
        Self {
            moderation,
            completion,
            model: DEFAULT_COMPLETION_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer the latest turn of `turns`.
    pub async fn respond(&self, turns: &[ConversationTurn]) -> Result<ChatReply, PipelineError> {
        if let Some(last_user) = turns.iter().rev().find(|turn| turn.role == Role::User) {
            let verdict = self.moderation.classify(&last_user.content).await;
            if let Some(canned) = route_on_flag(&verdict) {
                info!(reply = ?canned, categories = ?verdict.categories, "turn redirected by moderation");
                return Ok(ChatReply::new(canned.message()));
            }
        }

        let request = self.build_request(turns);
        debug!(
            model = %request.model,
            context_turns = request.messages.len() - 1,
            "forwarding turn to completion backend"
        );

        let reply = self.completion.complete(&request).await.map_err(|err| {
            warn!(kind = %err.kind, error = %err, "completion backend failed");
            PipelineError::Completion(err)
        })?;

        match reply.filter(|text| !text.trim().is_empty()) {
            Some(text) => Ok(ChatReply::new(text)),
            None => {
                debug!("completion backend returned no text, using fallback reply");
                Ok(ChatReply::new(FALLBACK_REPLY))
            }
        }
    }

    /// Persona directive followed by the trailing context window.
    pub fn build_request(&self, turns: &[ConversationTurn]) -> CompletionRequest {
        let window = &turns[turns.len().saturating_sub(CONTEXT_WINDOW)..];

        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.push(CompletionMessage::system(PERSONA_PROMPT));
        messages.extend(window.iter().map(CompletionMessage::from));

        CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}
