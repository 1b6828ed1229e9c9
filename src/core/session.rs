//! Per-flow checkout: one finalized donation, at most one charge in flight
//!
//! A [`CheckoutSession`] is created when the donor reaches the payment step
//! and lives as long as that step does. It enforces three rules:
//!
//! - form validation happens before anything suspends, so bad input is
//!   reported immediately
//! - while a charge is being processed, further `submit` calls are rejected
//! - once the session is cancelled, a charge that resolves late is discarded
//!   instead of being reported to a screen that no longer exists

use super::error::{DonateError, SubmissionError};
use super::events::{EventBus, FlowEvent};
use super::flow::FinalizedDonation;
use super::payment::{
    ChargeError, ChargeRequest, FailureReason, PaymentForm, PaymentProcessor, SubmissionOutcome,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Default upper bound on a single charge
pub const DEFAULT_CHARGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Checkout state for one finalized donation
pub struct CheckoutSession<P> {
    id: Uuid,
    donation: FinalizedDonation,
    processor: P,
    timeout: Duration,
    in_flight: AtomicBool,
    cancelled: watch::Sender<bool>,
    events: Option<EventBus>,
}

impl<P: PaymentProcessor> CheckoutSession<P> {
    pub fn new(donation: FinalizedDonation, processor: P) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            donation,
            processor,
            timeout: DEFAULT_CHARGE_TIMEOUT,
            in_flight: AtomicBool::new(false),
            cancelled,
            events: None,
        }
    }

    /// Fail a charge with [`FailureReason::Timeout`] after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Publish lifecycle events to `bus`, starting with `CheckoutOpened`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        bus.publish(FlowEvent::CheckoutOpened {
            session_id: self.id,
            donation_amount: self.donation.donation_amount().value(),
            processing_fee: self.donation.processing_fee(),
            total_charge: self.donation.total_charge(),
        });
        self.events = Some(bus);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn donation(&self) -> &FinalizedDonation {
        &self.donation
    }

    /// True while a charge is pending; the submit button should be disabled
    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Dispose of the session; a pending charge's outcome will be discarded
    pub fn cancel(&self) {
        if !self.cancelled.send_replace(true) {
            tracing::info!(session_id = %self.id, "Checkout session cancelled");
            self.publish(FlowEvent::SessionCancelled {
                session_id: self.id,
            });
        }
    }

    /// Validate `form` and charge the finalized total
    ///
    /// Validation errors return at once without waiting on the processor.
    /// Declines, processor failures and timeouts come back as
    /// `Ok(SubmissionOutcome::Failure { .. })` after processing.
    pub async fn submit(&self, form: PaymentForm) -> Result<SubmissionOutcome, DonateError> {
        if self.is_cancelled() {
            return Err(SubmissionError::Cancelled.into());
        }
        if self.is_processing() {
            return Err(SubmissionError::InFlight.into());
        }

        let payment = form.validate()?;

        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SubmissionError::InFlight)?;

        let request = ChargeRequest {
            session_id: self.id,
            donation_amount: self.donation.donation_amount().value(),
            processing_fee: self.donation.processing_fee(),
            total_charge: self.donation.total_charge(),
            payment,
        };

        tracing::info!(
            session_id = %self.id,
            total_charge = %request.total_charge,
            "Processing donation payment"
        );
        self.publish(FlowEvent::SubmissionStarted {
            session_id: self.id,
        });

        let mut cancelled = self.cancelled.subscribe();
        let result = tokio::select! {
            biased;
            _ = cancelled.wait_for(|cancelled| *cancelled) => None,
            result = tokio::time::timeout(self.timeout, self.processor.charge(&request)) => Some(result),
        };

        let Some(result) = result.filter(|_| !self.is_cancelled()) else {
            tracing::debug!(session_id = %self.id, "Discarding outcome of cancelled checkout");
            self.publish(FlowEvent::SubmissionDiscarded {
                session_id: self.id,
            });
            return Err(SubmissionError::Cancelled.into());
        };

        let outcome = match result {
            Ok(Ok(receipt)) => SubmissionOutcome::Success(receipt),
            Ok(Err(ChargeError::Declined)) => SubmissionOutcome::Failure {
                reason: FailureReason::Declined,
            },
            Ok(Err(ChargeError::Unexpected(message))) => {
                tracing::error!(session_id = %self.id, error = %message, "Payment processing failed");
                SubmissionOutcome::Failure {
                    reason: FailureReason::Unexpected,
                }
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %self.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Payment processing timed out"
                );
                SubmissionOutcome::Failure {
                    reason: FailureReason::Timeout,
                }
            }
        };

        match &outcome {
            SubmissionOutcome::Success(receipt) => {
                tracing::info!(
                    session_id = %self.id,
                    transaction_id = %receipt.transaction_id,
                    "Donation payment succeeded"
                );
                self.publish(FlowEvent::SubmissionResolved {
                    session_id: self.id,
                    transaction_id: Some(receipt.transaction_id.clone()),
                    failure: None,
                });
            }
            SubmissionOutcome::Failure { reason } => {
                tracing::info!(session_id = %self.id, reason = ?reason, "Donation payment failed");
                self.publish(FlowEvent::SubmissionResolved {
                    session_id: self.id,
                    transaction_id: None,
                    failure: Some(*reason),
                });
            }
        }

        Ok(outcome)
    }

    fn publish(&self, event: FlowEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}

/// Holds the in-flight flag for the duration of one charge
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
