//! Core module containing the donation flow: fees, amount selection, payment and receipt

pub mod error;
pub mod events;
pub mod fees;
pub mod flow;
pub mod payment;
pub mod receipt;
pub mod session;

pub use error::{DonateError, GatewayError, SubmissionError, UserMessage, ValidationError};
pub use events::{EventBus, EventEnvelope, FlowEvent};
pub use fees::{FeeBreakdown, FeeSchedule, compute_fees, round2};
pub use flow::{AmountLimits, AmountSelection, DonationAmount, DonationFlow, FinalizedDonation};
pub use payment::{
    ChargeReceipt, FailureReason, PaymentForm, PaymentProcessor, SimulatedProcessor,
    SubmissionOutcome, ValidatedPayment,
};
pub use receipt::{ConfirmationRecord, RecordingInvite};
pub use session::CheckoutSession;
