//! Signed access-token codec
//!
//! Tokens are HS256 JWTs carrying the payment reference, a `paid` flag and
//! the issuance time in epoch milliseconds. A registered `exp` claim is set
//! 24 hours after issuance; both it and the millisecond age are checked
//! against the caller-supplied clock.

use crate::error::CredentialError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifetime of an access token.
pub const SESSION_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Fallback signing secret for local development.
///
/// Anyone who knows this value can forge tokens. It must never sign tokens
/// in a deployed environment.
pub const DEVELOPMENT_SECRET: &str = "default-secret-key-change-me-in-production";

const SESSION_TTL_SECS: i64 = SESSION_TTL_MILLIS / 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessClaims {
    /// Payment provider session the token was minted for.
    session_id: String,
    #[serde(default)]
    paid: bool,
    /// Issuance time, epoch milliseconds.
    created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    /// Expiry, epoch seconds.
    exp: i64,
}

/// Opaque signed credential handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NoToken,
    NotPaid,
    Expired,
    InvalidToken,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::NoToken => "no_token",
            InvalidReason::NotPaid => "not_paid",
            InvalidReason::Expired => "expired",
            InvalidReason::InvalidToken => "invalid_token",
        }
    }
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`CredentialCodec::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid {
        payment_reference: String,
        remaining_millis: i64,
    },
    Invalid(InvalidReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }
}

/// Mints and verifies access tokens with a key derived from the process secret.
pub struct CredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec").finish_non_exhaustive()
    }
}

impl CredentialCodec {
    pub fn new(secret: &SecretString) -> Self {
        Self::from_secret_bytes(secret.expose_secret().as_bytes())
    }

    pub fn from_secret_bytes(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is judged against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for a confirmed payment.
    pub fn mint(
        &self,
        payment_reference: &str,
        now_millis: i64,
    ) -> Result<AccessToken, CredentialError> {
        let issued_secs = now_millis.div_euclid(1000);
        let claims = AccessClaims {
            session_id: payment_reference.to_string(),
            paid: true,
            created_at: now_millis,
            iat: Some(issued_secs),
            exp: issued_secs + SESSION_TTL_SECS,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(AccessToken(token))
    }

    /// Check a presented token. Never fails; every problem maps to a reason.
    pub fn verify(&self, token: &str, now_millis: i64) -> Verification {
        if token.is_empty() {
            return Verification::Invalid(InvalidReason::NoToken);
        }

        let claims = match decode::<AccessClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(err) => {
                debug!(error = %err, "access token failed verification");
                return Verification::Invalid(InvalidReason::InvalidToken);
            }
        };

        if !claims.paid {
            return Verification::Invalid(InvalidReason::NotPaid);
        }

        let age = now_millis.saturating_sub(claims.created_at);
        if age > SESSION_TTL_MILLIS || now_millis.div_euclid(1000) > claims.exp {
            return Verification::Invalid(InvalidReason::Expired);
        }

        Verification::Valid {
            payment_reference: claims.session_id,
            remaining_millis: SESSION_TTL_MILLIS - age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000_000;

    fn codec() -> CredentialCodec {
        CredentialCodec::from_secret_bytes(b"test-signing-secret")
    }

    fn sign_raw(claims: &AccessClaims, algorithm: Algorithm, secret: &[u8]) -> String {
        encode(&Header::new(algorithm), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn fresh_token_is_valid_for_a_full_day() {
        let codec = codec();
        let token = codec.mint("cs_test_123", NOW).unwrap();

        assert_eq!(
            codec.verify(token.as_str(), NOW),
            Verification::Valid {
                payment_reference: "cs_test_123".to_string(),
                remaining_millis: SESSION_TTL_MILLIS,
            }
        );
    }

    #[test]
    fn remaining_time_decreases_with_age() {
        let codec = codec();
        let token = codec.mint("cs_test_123", NOW).unwrap();

        match codec.verify(token.as_str(), NOW + 60_000) {
            Verification::Valid {
                remaining_millis, ..
            } => assert_eq!(remaining_millis, SESSION_TTL_MILLIS - 60_000),
            other => panic!("expected valid verdict, got {:?}", other),
        }
    }

    #[test]
    fn token_is_valid_up_to_exactly_one_day() {
        let codec = codec();
        let token = codec.mint("cs_edge", NOW).unwrap();

        assert!(codec.verify(token.as_str(), NOW + SESSION_TTL_MILLIS).is_valid());
        assert_eq!(
            codec.verify(token.as_str(), NOW + SESSION_TTL_MILLIS + 1),
            Verification::Invalid(InvalidReason::Expired)
        );
    }

    #[test]
    fn empty_token_is_missing() {
        assert_eq!(
            codec().verify("", NOW),
            Verification::Invalid(InvalidReason::NoToken)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = codec();
        for token in ["not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9..", "🙃"] {
            assert_eq!(
                codec.verify(token, NOW),
                Verification::Invalid(InvalidReason::InvalidToken),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let codec = codec();
        let token = codec.mint("cs_test_123", NOW).unwrap().into_string();
        let forged_claims = AccessClaims {
            session_id: "cs_someone_else".to_string(),
            paid: true,
            created_at: NOW,
            iat: None,
            exp: NOW / 1000 + SESSION_TTL_SECS,
        };
        let forged = sign_raw(&forged_claims, Algorithm::HS256, b"x");

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let spliced = parts.join(".");

        assert_eq!(
            codec.verify(&spliced, NOW),
            Verification::Invalid(InvalidReason::InvalidToken)
        );
    }

    #[test]
    fn other_algorithm_is_invalid() {
        let claims = AccessClaims {
            session_id: "cs_test_123".to_string(),
            paid: true,
            created_at: NOW,
            iat: None,
            exp: NOW / 1000 + SESSION_TTL_SECS,
        };
        let token = sign_raw(&claims, Algorithm::HS512, b"test-signing-secret");

        assert_eq!(
            codec().verify(&token, NOW),
            Verification::Invalid(InvalidReason::InvalidToken)
        );
    }

    #[test]
    fn unpaid_claims_are_refused() {
        let claims = AccessClaims {
            session_id: "cs_test_123".to_string(),
            paid: false,
            created_at: NOW,
            iat: None,
            exp: NOW / 1000 + SESSION_TTL_SECS,
        };
        let token = sign_raw(&claims, Algorithm::HS256, b"test-signing-secret");

        assert_eq!(
            codec().verify(&token, NOW),
            Verification::Invalid(InvalidReason::NotPaid)
        );
    }

    #[test]
    fn missing_paid_flag_is_refused() {
        let header = Header::new(Algorithm::HS256);
        let claims = serde_json::json!({
            "sessionId": "cs_test_123",
            "createdAt": NOW,
            "exp": NOW / 1000 + SESSION_TTL_SECS,
        });
        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();

        assert_eq!(
            codec().verify(&token, NOW),
            Verification::Invalid(InvalidReason::NotPaid)
        );
    }

    #[test]
    fn registered_expiry_is_enforced() {
        let claims = AccessClaims {
            session_id: "cs_test_123".to_string(),
            paid: true,
            created_at: NOW,
            iat: None,
            exp: NOW / 1000 + 60,
        };
        let token = sign_raw(&claims, Algorithm::HS256, b"test-signing-secret");

        assert!(codec().verify(&token, NOW).is_valid());
        assert_eq!(
            codec().verify(&token, NOW + 61_000 + 999),
            Verification::Invalid(InvalidReason::Expired)
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let token = codec().mint("cs_test_123", NOW).unwrap();
        assert_eq!(format!("{:?}", token), "AccessToken(<redacted>)");
    }

    proptest! {
        #[test]
        fn minted_tokens_verify_with_their_reference(
            reference in "[A-Za-z0-9_]{1,64}",
            now in 0i64..4_000_000_000_000,
        ) {
            let codec = codec();
            let token = codec.mint(&reference, now).unwrap();

            let first = codec.verify(token.as_str(), now);
            let second = codec.verify(token.as_str(), now);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                first,
                Verification::Valid { payment_reference: reference, remaining_millis: SESSION_TTL_MILLIS }
            );
        }

        #[test]
        fn tokens_older_than_a_day_are_expired(
            now in 0i64..4_000_000_000_000,
            overshoot in 1i64..10_000_000_000,
        ) {
            let codec = codec();
            let token = codec.mint("cs_prop", now).unwrap();
            prop_assert_eq!(
                codec.verify(token.as_str(), now + SESSION_TTL_MILLIS + overshoot),
                Verification::Invalid(InvalidReason::Expired)
            );
        }

        #[test]
        fn foreign_keys_are_rejected(
            secret in proptest::collection::vec(any::<u8>(), 1..48),
            now in 0i64..4_000_000_000_000,
        ) {
            prop_assume!(secret.as_slice() != b"test-signing-secret");
            let foreign = CredentialCodec::from_secret_bytes(&secret);
            let token = foreign.mint("cs_prop", now).unwrap();
            prop_assert_eq!(
                codec().verify(token.as_str(), now),
                Verification::Invalid(InvalidReason::InvalidToken)
            );
        }
    }
}
