//! Moderation backend abstraction

use async_trait::async_trait;
use rivers_types::{BackendError, ModerationVerdict};

/// Classifies text into the gateway's policy categories.
#[async_trait]
pub trait ModerationBackend: Send + Sync {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, BackendError>;
}
