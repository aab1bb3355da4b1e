//! Error types for token issuance

use thiserror::Error;

/// Errors raised while minting an access token.
///
/// Verification never produces an error value; it reports an
/// [`InvalidReason`](crate::InvalidReason) instead.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to sign access token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
