//! Error types for the conversation pipeline

use rivers_types::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("Messages are required")]
    MissingMessages,

    #[error("Invalid message format")]
    InvalidMessage,

    #[error(transparent)]
    Completion(#[from] BackendError),
}

impl PipelineError {
    /// True for errors caused by the request rather than a backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PipelineError::Completion(_))
    }
}
