//! Payment-intent backend reached over HTTP

use super::{PaymentGateway, PaymentIntentRequest, PaymentIntentResponse};
use crate::config::GatewayConfig;
use crate::core::error::GatewayError;
use async_trait::async_trait;

/// Posts intents to `<backend_url>/create-payment-intent`
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/create-payment-intent",
                config.backend_url.trim_end_matches('/')
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error creating payment intent");
                GatewayError::Transport {
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Error creating payment intent");
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }

        response
            .json::<PaymentIntentResponse>()
            .await
            .map_err(|e| GatewayError::Transport {
                message: e.to_string(),
            })
    }
}
