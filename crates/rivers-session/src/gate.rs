//! Session gate: cookie → verdict
//!
//! The gate owns both sides of the session cookie. It builds the cookie set
//! after a confirmed checkout and reads it back on every page load.

use crate::codec::{AccessToken, CredentialCodec, InvalidReason, Verification, SESSION_TTL_MILLIS};
use cookie::{time::Duration, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_COOKIE_NAME: &str = "emily_session";

/// Attributes of the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookieConfig {
    pub name: String,
    /// Set the `Secure` attribute. Enabled in production.
    pub secure: bool,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
        }
    }
}

/// JSON verdict reported by `GET /session`.
///
/// Exactly one of `reason` or (`session_id`, `expires_in`) is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVerdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Milliseconds until the session expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl SessionVerdict {
    pub fn rejected(reason: InvalidReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            session_id: None,
            expires_in: None,
        }
    }
}

impl From<Verification> for SessionVerdict {
    fn from(verification: Verification) -> Self {
        match verification {
            Verification::Valid {
                payment_reference,
                remaining_millis,
            } => Self {
                valid: true,
                reason: None,
                session_id: Some(payment_reference),
                expires_in: Some(remaining_millis),
            },
            Verification::Invalid(reason) => Self::rejected(reason),
        }
    }
}

/// Validates the session cookie presented with a request.
#[derive(Debug, Clone)]
pub struct SessionGate {
    codec: Arc<CredentialCodec>,
    cookie: SessionCookieConfig,
}

impl SessionGate {
    pub fn new(codec: Arc<CredentialCodec>, cookie: SessionCookieConfig) -> Self {
        Self { codec, cookie }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    pub fn codec(&self) -> &Arc<CredentialCodec> {
        &self.codec
    }

    /// Verdict for the value of the session cookie, if one was sent.
    pub fn check_session(&self, cookie_value: Option<&str>, now_millis: i64) -> SessionVerdict {
        let Some(token) = cookie_value.filter(|value| !value.is_empty()) else {
            return SessionVerdict::rejected(InvalidReason::NoToken);
        };

        let verdict = SessionVerdict::from(self.codec.verify(token, now_millis));
        if let Some(reason) = verdict.reason {
            debug!(%reason, "session rejected");
        }
        verdict
    }

    /// Session cookie carrying `token`.
    pub fn session_cookie(&self, token: AccessToken) -> Cookie<'static> {
        Cookie::build((self.cookie.name.clone(), token.into_string()))
            .http_only(true)
            .secure(self.cookie.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::milliseconds(SESSION_TTL_MILLIS))
            .path("/")
            .build()
    }
}
