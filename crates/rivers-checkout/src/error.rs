//! Error types for the checkout bridge

use rivers_types::BackendError;
use thiserror::Error;

/// Failure to open a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Provider(#[from] BackendError),

    #[error("payment provider returned session {0} without a redirect url")]
    MissingRedirectUrl(String),
}

/// Reason a checkout completion did not unlock a session.
///
/// Each variant is reported to the landing page as the `error` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutFailure {
    #[error("missing_session")]
    MissingSession,

    #[error("payment_not_complete")]
    PaymentNotComplete,

    #[error("verification_failed")]
    VerificationFailed,
}

impl CheckoutFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutFailure::MissingSession => "missing_session",
            CheckoutFailure::PaymentNotComplete => "payment_not_complete",
            CheckoutFailure::VerificationFailed => "verification_failed",
        }
    }

    /// Landing-page location carrying this failure.
    pub fn redirect_target(&self) -> String {
        format!("/?error={}", self.as_str())
    }
}
