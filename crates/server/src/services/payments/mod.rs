//! Payment gateway integration.
//!
//! The gateway is reached through the narrow [`PaymentGateway`] trait
//! (order creation plus callback-signature verification) so the bridge logic
//! in [`bridge`] is testable without the vendor. The production
//! implementation is the HTTP client in [`gateway`].

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod bridge;
pub mod gateway;
pub mod signature;

pub use bridge::PaymentBridge;
pub use gateway::HttpPaymentGateway;

/// Errors that can occur when interacting with the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the gateway response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A gateway-side order: an amount to be collected, referenced by id.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrder {
    /// Gateway order id, passed back in the payment callback.
    pub id: String,
    /// Amount in the gateway's minor currency unit (paise).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Seam for the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway order for `amount_minor` in `currency`, tagged with
    /// `receipt` (our booking id) for reconciliation on the gateway side.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Whether `signature` is a genuine gateway signature over the
    /// order/payment id pair. Pure computation against the server-held key.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
