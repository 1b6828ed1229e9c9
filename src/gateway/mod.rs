//! Payment-intent backend integration point
//!
//! The checkout flow does not go through here: its charges run through
//! [`PaymentProcessor`](crate::core::payment::PaymentProcessor). This module is
//! the reference shape for a real card gateway that creates a payment intent
//! server-side and hands the client a secret to confirm it with.

#[cfg(feature = "http-gateway")]
pub mod http;
pub mod mock;

#[cfg(feature = "http-gateway")]
pub use http::HttpGateway;
pub use mock::MockGateway;

use crate::core::error::GatewayError;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request to create a payment intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in cents
    pub amount: u64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentRequest {
    /// Build a request for a dollar amount
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount: amount_to_cents(amount),
            currency: currency.into(),
            description: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Created intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Backend able to create payment intents
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, GatewayError>;
}

/// Dollars to cents, half away from zero; negative amounts clamp to 0
pub fn amount_to_cents(amount: Decimal) -> u64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

/// Webhook hook for intent status updates
///
/// A real backend updates payment status and sends receipts here; the demo
/// only records that the webhook fired.
pub fn handle_payment_webhook(payment_intent_id: &str) {
    tracing::info!(payment_intent_id, "Payment webhook received");
}
