//! Payment provider abstraction

use async_trait::async_trait;
use rivers_types::BackendError;
use serde::Deserialize;

/// Single-item, one-time-payment session to open with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub product_description: String,
    /// Price in the currency's minor unit.
    pub unit_amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

/// Provider-side view of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page. Absent once the session has completed.
    #[serde(default)]
    pub url: Option<String>,
    pub payment_status: PaymentStatus,
}

/// Hosted checkout service.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, BackendError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BackendError>;
}
