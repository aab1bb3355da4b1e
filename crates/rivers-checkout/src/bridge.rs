//! Checkout creation and completion

use crate::error::{CheckoutError, CheckoutFailure};
use crate::provider::{CheckoutSessionRequest, PaymentProvider, PaymentStatus};
use rivers_session::{AccessToken, CredentialCodec};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The single item sold at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOffer {
    pub product_name: String,
    pub product_description: String,
    /// Price in the currency's minor unit.
    pub unit_amount: i64,
    pub currency: String,
    pub metadata: Vec<(String, String)>,
}

impl Default for CheckoutOffer {
    fn default() -> Self {
        Self {
            product_name: "Chat with Emily Rivers 💕".to_string(),
            product_description: "One-time chat session with your favorite virtual companion"
                .to_string(),
            unit_amount: 500,
            currency: "usd".to_string(),
            metadata: vec![("product".to_string(), "emily_rivers_chat".to_string())],
        }
    }
}

/// Response body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRedirect {
    pub url: String,
}

/// A payment the provider confirmed, with the token minted for it.
#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub payment_reference: String,
    pub token: AccessToken,
}

pub struct CheckoutBridge {
    provider: Arc<dyn PaymentProvider>,
    codec: Arc<CredentialCodec>,
    offer: CheckoutOffer,
    base_url: String,
}

impl CheckoutBridge {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        codec: Arc<CredentialCodec>,
        offer: CheckoutOffer,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            codec,
            offer,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Where a confirmed checkout sends the client.
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    fn session_request(&self) -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            product_name: self.offer.product_name.clone(),
            product_description: self.offer.product_description.clone(),
            unit_amount: self.offer.unit_amount,
            currency: self.offer.currency.clone(),
            success_url: format!(
                "{}/checkout-success?session_id={{CHECKOUT_SESSION_ID}}",
                self.base_url
            ),
            cancel_url: format!("{}?cancelled=true", self.base_url),
            metadata: self.offer.metadata.clone(),
        }
    }

    /// Open a hosted payment session and return its redirect URL.
    pub async fn create_checkout(&self) -> Result<CheckoutRedirect, CheckoutError> {
        let session = self.provider.create_session(&self.session_request()).await?;
        let url = session
            .url
            .ok_or_else(|| CheckoutError::MissingRedirectUrl(session.id.clone()))?;

        info!(session_id = %session.id, "checkout session created");
        Ok(CheckoutRedirect { url })
    }

    /// Exchange a provider session id for an access token.
    ///
    /// Redeeming the same paid session twice mints two independent tokens.
    pub async fn complete_checkout(
        &self,
        session_id: Option<&str>,
        now_millis: i64,
    ) -> Result<ConfirmedPayment, CheckoutFailure> {
        let session_id = session_id
            .filter(|id| !id.is_empty())
            .ok_or(CheckoutFailure::MissingSession)?;

        let session = self
            .provider
            .retrieve_session(session_id)
            .await
            .map_err(|err| {
                warn!(kind = %err.kind, error = %err, "checkout session lookup failed");
                CheckoutFailure::VerificationFailed
            })?;

        if session.payment_status != PaymentStatus::Paid {
            info!(session_id, status = ?session.payment_status, "checkout not paid");
            return Err(CheckoutFailure::PaymentNotComplete);
        }

        let token = self.codec.mint(session_id, now_millis).map_err(|err| {
            error!(error = %err, "failed to mint access token");
            CheckoutFailure::VerificationFailed
        })?;

        info!(session_id, "payment confirmed, access token issued");
        Ok(ConfirmedPayment {
            payment_reference: session_id.to_string(),
            token,
        })
    }
}
