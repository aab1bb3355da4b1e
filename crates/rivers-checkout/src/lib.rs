//! Payment-to-session exchange.
//!
//! [`CheckoutBridge`] opens a one-time payment session with a
//! [`PaymentProvider`] and, once the provider confirms the payment, mints the
//! access token that unlocks chat. The provider is the only source of truth
//! for payment status; nothing is recorded locally.

#![deny(unsafe_code)]

mod bridge;
mod error;
mod provider;
mod stripe;

pub use bridge::{CheckoutBridge, CheckoutOffer, CheckoutRedirect, ConfirmedPayment};
pub use error::{CheckoutError, CheckoutFailure};
pub use provider::{CheckoutSession, CheckoutSessionRequest, PaymentProvider, PaymentStatus};
pub use stripe::{StripeCheckoutProvider, DEFAULT_STRIPE_API_BASE};
