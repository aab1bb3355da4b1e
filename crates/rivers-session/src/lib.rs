//! Payment-backed access sessions.
//!
//! - [`CredentialCodec`] mints and verifies the signed, expiring access token
//!   issued after a confirmed payment.
//! - [`SessionGate`] reads that token from the session cookie and reports a
//!   JSON-serializable [`SessionVerdict`].
//!
//! Both are pure functions of the signing secret and their inputs; the
//! current time is always passed in by the caller.

#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod gate;

pub use codec::{
    AccessToken, CredentialCodec, InvalidReason, Verification, DEVELOPMENT_SECRET,
    SESSION_TTL_MILLIS,
};
pub use error::CredentialError;
pub use gate::{SessionCookieConfig, SessionGate, SessionVerdict, DEFAULT_COOKIE_NAME};
