//! Conversation pipeline for a single chat turn.
//!
//! The pipeline is stateless: the caller sends the whole history with every
//! request. Each turn is moderated, then either answered with a canned
//! redirect or forwarded, with the persona preamble and a bounded window of
//! history, to a [`CompletionBackend`].

#![deny(unsafe_code)]

mod backend;
mod error;
mod openai;
mod persona;
mod pipeline;

pub use backend::{CompletionBackend, CompletionMessage, CompletionRequest, CompletionRole};
pub use error::PipelineError;
pub use openai::{OpenAiCompatibleCompletion, DEFAULT_COMPLETION_BASE_URL};
pub use persona::PERSONA_PROMPT;
pub use pipeline::{
    parse_turns, ConversationPipeline, CONTEXT_WINDOW, DEFAULT_COMPLETION_MODEL, FALLBACK_REPLY,
    MAX_OUTPUT_TOKENS, TEMPERATURE,
};
