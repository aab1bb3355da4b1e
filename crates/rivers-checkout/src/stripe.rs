//! Stripe Checkout client

use crate::provider::{CheckoutSession, CheckoutSessionRequest, PaymentProvider};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use rivers_types::{truncate, Backend, BackendError, BackendErrorKind};
use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Payment provider backed by the Stripe Checkout Sessions API.
pub struct StripeCheckoutProvider {
    http: Client,
    sessions_endpoint: String,
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeCheckoutProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeCheckoutProvider")
            .field("sessions_endpoint", &self.sessions_endpoint)
            .finish_non_exhaustive()
    }
}

impl StripeCheckoutProvider {
    pub fn new(http: Client, api_base: &str, secret_key: SecretString) -> Self {
        Self {
            http,
            sessions_endpoint: format!("{}/checkout/sessions", api_base.trim_end_matches('/')),
            secret_key,
        }
    }

    fn secret_key(&self) -> Result<&str, BackendError> {
        let key = self.secret_key.expose_secret();
        if key.trim().is_empty() {
            return Err(BackendError::new(
                Backend::Payment,
                BackendErrorKind::InvalidConfig,
                "payment provider secret key is not configured",
            ));
        }
        Ok(key)
    }

    fn session_url(&self, session_id: &str) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.sessions_endpoint).map_err(|e| {
            BackendError::new(
                Backend::Payment,
                BackendErrorKind::InvalidConfig,
                format!("invalid payment api base {}: {}", self.sessions_endpoint, e),
            )
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::new(
                    Backend::Payment,
                    BackendErrorKind::InvalidConfig,
                    format!("payment api base {} cannot carry a path", self.sessions_endpoint),
                )
            })?
            .push(session_id);
        Ok(url)
    }
}

/// Stripe's bracketed form encoding for a checkout session.
fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.product_name.clone(),
        ),
        (
            "line_items[0][price_data][product_data][description]".to_string(),
            request.product_description.clone(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    form.extend(
        request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value.clone())),
    );
    form
}

async fn read_session(response: Response) -> Result<CheckoutSession, BackendError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::new(
            Backend::Payment,
            BackendErrorKind::Status,
            format!("payment provider error {}: {}", status, truncate(&body, 320)),
        ));
    }

    response.json().await.map_err(|e| {
        BackendError::new(
            Backend::Payment,
            BackendErrorKind::Decode,
            format!("invalid checkout session response: {}", e),
        )
    })
}

fn request_failed(e: reqwest::Error) -> BackendError {
    BackendError::request_failed(
        Backend::Payment,
        e.is_timeout(),
        format!("payment provider request failed: {}", e),
    )
}

#[async_trait]
impl PaymentProvider for StripeCheckoutProvider {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, BackendError> {
        let response = self
            .http
            .post(&self.sessions_endpoint)
            .bearer_auth(self.secret_key()?)
            .form(&session_form(request))
            .send()
            .await
            .map_err(request_failed)?;

        read_session(response).await
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BackendError> {
        let response = self
            .http
            .get(self.session_url(session_id)?)
            .bearer_auth(self.secret_key()?)
            .send()
            .await
            .map_err(request_failed)?;

        read_session(response).await
    }
}
