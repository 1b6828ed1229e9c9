//! Charge processing behind a trait
//!
//! [`PaymentProcessor`] is the seam where a real gateway plugs in. The crate
//! ships [`SimulatedProcessor`], which waits a fixed delay and approves or
//! declines according to an injectable [`ApprovalPolicy`].

use super::{ChargeReceipt, ValidatedPayment};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Everything a processor needs to attempt a charge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Checkout session the charge belongs to
    pub session_id: Uuid,
    pub donation_amount: Decimal,
    pub processing_fee: Decimal,
    pub total_charge: Decimal,
    pub payment: ValidatedPayment,
}

/// Why a processor refused or failed a charge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargeError {
    #[error("payment declined")]
    Declined,

    #[error("unexpected processing failure: {0}")]
    Unexpected(String),
}

/// Something that can charge a validated payment
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Attempt the charge; may suspend for the network round trip
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, ChargeError>;
}

#[async_trait]
impl<P: PaymentProcessor + ?Sized> PaymentProcessor for Arc<P> {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, ChargeError> {
        (**self).charge(request).await
    }
}

/// Source of transaction identifiers, unique per call
pub trait TransactionIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// `TXN<millis>` identifiers from a millisecond clock
///
/// The millisecond part never repeats: two calls inside the same millisecond
/// get consecutive values.
pub struct ClockTransactionIds {
    clock: Box<dyn Fn() -> i64 + Send + Sync>,
    last: AtomicI64,
}

impl ClockTransactionIds {
    /// Use the wall clock
    pub fn new() -> Self {
        Self::with_clock(|| Utc::now().timestamp_millis())
    }

    /// Use a custom millisecond clock
    pub fn with_clock(clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            last: AtomicI64::new(i64::MIN),
        }
    }
}

impl Default for ClockTransactionIds {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionIdSource for ClockTransactionIds {
    fn next_id(&self) -> String {
        let now = (self.clock)();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or(now);
        let millis = now.max(previous.saturating_add(1));
        format!("TXN{}", millis)
    }
}

/// Decides whether a simulated charge is approved
pub trait ApprovalPolicy: Send + Sync {
    fn approve(&self, request: &ChargeRequest) -> bool;
}

impl<F> ApprovalPolicy for F
where
    F: Fn(&ChargeRequest) -> bool + Send + Sync,
{
    fn approve(&self, request: &ChargeRequest) -> bool {
        self(request)
    }
}

/// Approve a fixed fraction of charges at random
#[derive(Debug, Clone, Copy)]
pub struct RandomApproval {
    rate: f64,
}

impl RandomApproval {
    /// `rate` is clamped to `0.0..=1.0`; a non-finite rate approves nothing
    pub fn new(rate: f64) -> Self {
        Self {
            rate: probability(rate),
        }
    }
}

impl ApprovalPolicy for RandomApproval {
    fn approve(&self, _request: &ChargeRequest) -> bool {
        rand::thread_rng().gen_bool(self.rate)
    }
}

/// Clamp `rate` into a probability `gen_bool` accepts
pub(crate) fn probability(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Stand-in processor: wait, then approve or decline
pub struct SimulatedProcessor {
    delay: Duration,
    approval: Arc<dyn ApprovalPolicy>,
    ids: Arc<dyn TransactionIdSource>,
}

impl SimulatedProcessor {
    /// Random approvals at `approval_rate`, wall-clock transaction ids
    pub fn new(delay: Duration, approval_rate: f64) -> Self {
        Self {
            delay,
            approval: Arc::new(RandomApproval::new(approval_rate)),
            ids: Arc::new(ClockTransactionIds::new()),
        }
    }

    pub fn with_approval(mut self, approval: impl ApprovalPolicy + 'static) -> Self {
        self.approval = Arc::new(approval);
        self
    }

    pub fn with_ids(mut self, ids: impl TransactionIdSource + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, ChargeError> {
        tokio::time::sleep(self.delay).await;

        if !self.approval.approve(request) {
            tracing::debug!(session_id = %request.session_id, "Simulated charge declined");
            return Err(ChargeError::Declined);
        }

        Ok(ChargeReceipt {
            transaction_id: self.ids.next_id(),
            email: request.payment.email.clone(),
            card_last4: request.payment.card_last4.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn request() -> ChargeRequest {
        ChargeRequest {
            session_id: Uuid::new_v4(),
            donation_amount: Decimal::from_str("25").unwrap(),
            processing_fee: Decimal::from_str("1.03").unwrap(),
            total_charge: Decimal::from_str("26.03").unwrap(),
            payment: ValidatedPayment {
                email: "jane@example.com".to_string(),
                card_last4: "4242".to_string(),
            },
        }
    }

    #[test]
    fn test_clock_ids_use_clock_value() {
        let ids = ClockTransactionIds::with_clock(|| 1_700_000_000_000);
        assert_eq!(ids.next_id(), "TXN1700000000000");
    }

    #[test]
    fn test_clock_ids_never_repeat_within_a_millisecond() {
        let ids = ClockTransactionIds::with_clock(|| 42);
        assert_eq!(ids.next_id(), "TXN42");
        assert_eq!(ids.next_id(), "TXN43");
        assert_eq!(ids.next_id(), "TXN44");
    }

    #[test]
    fn test_wall_clock_ids_are_unique() {
        let ids = ClockTransactionIds::new();
        let generated: HashSet<String> = (0..500).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 500);
        assert!(generated.iter().all(|id| id.starts_with("TXN")));
    }

    #[test]
    fn test_random_approval_extremes() {
        let req = request();
        assert!(RandomApproval::new(1.0).approve(&req));
        assert!(!RandomApproval::new(0.0).approve(&req));
        assert!(RandomApproval::new(7.0).approve(&req));
    }

    #[test]
    fn test_random_approval_non_finite_rate_declines() {
        let req = request();
        assert!(!RandomApproval::new(f64::NAN).approve(&req));
        assert!(!RandomApproval::new(f64::INFINITY).approve(&req));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_processor_with_nan_rate_declines() {
        let processor = SimulatedProcessor::new(Duration::from_millis(1), f64::NAN);
        assert_eq!(processor.charge(&request()).await, Err(ChargeError::Declined));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_approval_after_delay() {
        let processor = SimulatedProcessor::new(Duration::from_secs(2), 1.0)
            .with_ids(ClockTransactionIds::with_clock(|| 1000));

        let started = tokio::time::Instant::now();
        let receipt = processor.charge(&request()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(receipt.transaction_id, "TXN1000");
        assert_eq!(receipt.email, "jane@example.com");
        assert_eq!(receipt.card_last4, "4242");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_decline() {
        let processor = SimulatedProcessor::new(Duration::from_secs(2), 1.0)
            .with_approval(|_: &ChargeRequest| false);

        assert_eq!(processor.charge(&request()).await, Err(ChargeError::Declined));
    }
}
