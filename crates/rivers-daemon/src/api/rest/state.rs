//! Application state for API handlers

use rivers_checkout::CheckoutBridge;
use rivers_conversation::ConversationPipeline;
use rivers_session::SessionGate;
use std::sync::Arc;

/// Source of the current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall-clock time in epoch milliseconds.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session cookie validation
    pub gate: Arc<SessionGate>,

    /// Payment-to-session exchange
    pub checkout: Arc<CheckoutBridge>,

    /// Chat-turn pipeline
    pub pipeline: Arc<ConversationPipeline>,

    /// Time source for token minting and verification
    pub clock: Clock,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        gate: Arc<SessionGate>,
        checkout: Arc<CheckoutBridge>,
        pipeline: Arc<ConversationPipeline>,
    ) -> Self {
        Self {
            gate,
            checkout,
            pipeline,
            clock: system_clock(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now_millis(&self) -> i64 {
        (self.clock)()
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
