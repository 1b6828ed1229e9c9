//! Mock payment-intent backend for development

use super::{PaymentGateway, PaymentIntentRequest, PaymentIntentResponse};
use crate::core::error::GatewayError;
use crate::core::payment::processor::probability;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;

/// Fabricates intents after a fixed delay, failing some fraction of calls
pub struct MockGateway {
    delay: Duration,
    should_fail: Box<dyn Fn() -> bool + Send + Sync>,
    clock: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl MockGateway {
    /// Random failures at `failure_rate`, wall-clock ids
    ///
    /// A non-finite `failure_rate` never fails.
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        let failure_rate = probability(failure_rate);
        Self {
            delay,
            should_fail: Box::new(move || rand::thread_rng().gen_bool(failure_rate)),
            clock: Box::new(|| Utc::now().timestamp_millis()),
        }
    }

    pub fn with_failures(mut self, should_fail: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.should_fail = Box::new(should_fail);
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 0.05)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, GatewayError> {
        tokio::time::sleep(self.delay).await;

        if (self.should_fail)() {
            tracing::warn!(amount = request.amount, "Mock payment intent creation failed");
            return Err(GatewayError::IntentCreationFailed);
        }

        let millis = (self.clock)();
        tracing::debug!(amount = request.amount, currency = %request.currency, "Mock payment intent created");
        Ok(PaymentIntentResponse {
            client_secret: format!("pi_mock_{}_secret_mock", millis),
            payment_intent_id: format!("pi_mock_{}", millis),
        })
    }
}
