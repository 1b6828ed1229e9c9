//! Configuration loading and management

use crate::core::fees::FeeSchedule;
use crate::core::flow::{AmountLimits, DonationAmount};
use crate::core::payment::SimulatedProcessor;
use crate::gateway::MockGateway;
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulated charge processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Time a simulated charge takes
    pub delay_ms: u64,

    /// Fraction of simulated charges that are approved
    pub approval_rate: f64,

    /// Upper bound on any charge before it fails with a timeout
    pub timeout_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            approval_rate: 0.9,
            timeout_ms: 30_000,
        }
    }
}

/// Payment-intent backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub publishable_key: String,

    /// Base URL of the backend creating payment intents
    pub backend_url: String,

    pub currency: String,

    pub country: String,

    /// Delay of the mock backend
    pub mock_delay_ms: u64,

    /// Fraction of mock calls that fail
    pub mock_failure_rate: f64,
}

fn default_mock_delay_ms() -> u64 {
    1000
}

fn default_mock_failure_rate() -> f64 {
    0.05
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            publishable_key: "pk_test_your_stripe_publishable_key_here".to_string(),
            backend_url: "https://your-backend-api.com".to_string(),
            currency: "usd".to_string(),
            country: "US".to_string(),
            mock_delay_ms: default_mock_delay_ms(),
            mock_failure_rate: default_mock_failure_rate(),
        }
    }
}

/// Complete configuration for the donation flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonateConfig {
    /// One-tap amounts offered on the amount screen
    pub presets: Vec<DonationAmount>,

    #[serde(default)]
    pub limits: AmountLimits,

    #[serde(default)]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl DonateConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the flow cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.limits.minimum <= Decimal::ZERO {
            bail!("limits.minimum must be positive");
        }
        if self.limits.maximum < self.limits.minimum {
            bail!("limits.maximum must not be below limits.minimum");
        }
        if self.fees.rate < Decimal::ZERO || self.fees.fixed < Decimal::ZERO {
            bail!("fees must not be negative");
        }
        if let Some(preset) = self
            .presets
            .iter()
            .find(|p| self.limits.check(**p).is_err())
        {
            bail!("preset {} is outside the donation limits", preset);
        }
        for (name, rate) in [
            ("processing.approval_rate", self.processing.approval_rate),
            ("gateway.mock_failure_rate", self.gateway.mock_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                bail!("{} must be between 0 and 1 (got {})", name, rate);
            }
        }
        Ok(())
    }

    pub fn charge_timeout(&self) -> Duration {
        Duration::from_millis(self.processing.timeout_ms)
    }

    /// Simulated processor using these settings
    pub fn simulated_processor(&self) -> SimulatedProcessor {
        SimulatedProcessor::new(
            Duration::from_millis(self.processing.delay_ms),
            self.processing.approval_rate,
        )
    }

    /// Mock payment-intent backend using these settings
    pub fn mock_gateway(&self) -> MockGateway {
        MockGateway::new(
            Duration::from_millis(self.gateway.mock_delay_ms),
            self.gateway.mock_failure_rate,
        )
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            presets: [5, 10, 25, 50, 100]
                .into_iter()
                .filter_map(|v| DonationAmount::new(Decimal::from(v)))
                .collect(),
            limits: AmountLimits::default(),
            fees: FeeSchedule::default(),
            processing: ProcessingConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Default for DonateConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DonateConfig::default_config();

        assert_eq!(config.presets.len(), 5);
        assert_eq!(config.limits, AmountLimits::default());
        assert_eq!(config.gateway.currency, "usd");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = DonateConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = DonateConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.presets, config.presets);
        assert_eq!(parsed.fees, config.fees);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = DonateConfig::from_yaml_str("presets: [\"20\", \"40\"]\n").unwrap();

        assert_eq!(config.presets.len(), 2);
        assert_eq!(config.processing.delay_ms, 2000);
        assert_eq!(config.gateway.mock_failure_rate, 0.05);
        assert_eq!(config.charge_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_gateway_section_uses_defaults() {
        let yaml = "presets: [\"10\"]\ngateway:\n  backend_url: http://localhost:3001\n";
        let config = DonateConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.gateway.backend_url, "http://localhost:3001");
        assert_eq!(config.gateway.currency, "usd");
        assert_eq!(config.gateway.country, "US");
        assert_eq!(config.gateway.mock_delay_ms, 1000);
    }

    #[test]
    fn test_preset_outside_limits_rejected() {
        let err = DonateConfig::from_yaml_str("presets: [\"20000\"]\n").unwrap_err();
        assert!(err.to_string().contains("outside the donation limits"));
    }

    #[test]
    fn test_non_positive_preset_rejected() {
        assert!(DonateConfig::from_yaml_str("presets: [\"0\"]\n").is_err());
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let mut config = DonateConfig::default_config();
        config.processing.approval_rate = 1.5;
        assert!(config.validate().is_err());
    }
}
