//! Failure taxonomy for outbound provider calls

use thiserror::Error;

/// External collaborator that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Payment,
    Moderation,
    Completion,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Backend::Payment => "payment",
            Backend::Moderation => "moderation",
            Backend::Completion => "completion",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Missing credentials or an unusable endpoint.
    InvalidConfig,
    /// Connection, TLS, or protocol failure.
    Transport,
    /// The call exceeded its deadline.
    Timeout,
    /// Non-success HTTP status, including auth rejections.
    Status,
    /// Response body did not have the expected shape.
    Decode,
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackendErrorKind::InvalidConfig => "invalid_config",
            BackendErrorKind::Transport => "transport",
            BackendErrorKind::Timeout => "timeout",
            BackendErrorKind::Status => "status",
            BackendErrorKind::Decode => "decode",
        })
    }
}

/// Error returned at every external-call boundary.
#[derive(Debug, Clone, Error)]
#[error("{backend} backend {kind} error: {message}")]
pub struct BackendError {
    pub backend: Backend,
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(backend: Backend, kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            backend,
            kind,
            message: message.into(),
        }
    }

    /// Classify a failed request: deadline expiry is `Timeout`, everything
    /// else is `Transport`.
    pub fn request_failed(backend: Backend, timed_out: bool, message: impl Into<String>) -> Self {
        let kind = if timed_out {
            BackendErrorKind::Timeout
        } else {
            BackendErrorKind::Transport
        };
        Self::new(backend, kind, message)
    }
}

/// Cut `value` to at most `max_chars` characters for an error message,
/// marking the cut with `...`.
pub fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_backend_and_kind() {
        let err = BackendError::new(Backend::Completion, BackendErrorKind::Timeout, "30s elapsed");
        assert_eq!(err.to_string(), "completion backend timeout error: 30s elapsed");
    }

    #[test]
    fn request_failure_kind_follows_timeout_flag() {
        let timed_out = BackendError::request_failed(Backend::Moderation, true, "deadline");
        assert_eq!(timed_out.kind, BackendErrorKind::Timeout);

        let refused = BackendError::request_failed(Backend::Payment, false, "refused");
        assert_eq!(refused.kind, BackendErrorKind::Transport);
    }

    #[test]
    fn truncate_marks_cut_bodies() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }
}
