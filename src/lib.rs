//! # KindStream Donate
//!
//! The donation flow behind the KindStream app: pick an amount, see the
//! processing fee, fill in the payment form, charge, and show a receipt.
//! Screens and navigation are left to the host application; this crate holds
//! the logic they call into.
//!
//! ## Features
//!
//! - **Fee Calculation**: 2.9% + $0.30 passed to the donor, exact to the cent
//! - **Amount Selection**: preset and free-text amounts as a pure state machine
//! - **Payment Validation**: field-by-field checks with donor-facing messages
//! - **Checkout Sessions**: one charge in flight, cancellation, timeouts
//! - **Receipts**: confirmation record and share text
//! - **Mock Backend**: payment-intent stub standing in for a real gateway
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use donate::prelude::*;
//!
//! let config = DonateConfig::default_config();
//!
//! let flow = DonationFlow::with_schedule(config.fees).select_preset(config.presets[2]);
//! let donation = flow.finalize(&config.limits)?;
//!
//! let session = CheckoutSession::new(donation, config.simulated_processor())
//!     .with_timeout(config.charge_timeout());
//!
//! match session.submit(form).await? {
//!     SubmissionOutcome::Success(receipt) => {
//!         let record = ConfirmationRecord::assemble(session.donation(), receipt);
//!         println!("{}", record.share_message());
//!     }
//!     SubmissionOutcome::Failure { reason } => println!("{}", reason),
//! }
//! ```

pub mod capture;
pub mod config;
pub mod core;
pub mod gateway;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Flow ===
    pub use crate::core::{
        fees::{FeeBreakdown, FeeSchedule, compute_fees},
        flow::{AmountLimits, AmountSelection, DonationAmount, DonationFlow, FinalizedDonation},
        receipt::{ConfirmationRecord, RecordingInvite},
        session::CheckoutSession,
    };

    // === Payment ===
    pub use crate::core::payment::{
        ApprovalPolicy, ChargeError, ChargeReceipt, ChargeRequest, ClockTransactionIds,
        FailureReason, PaymentForm, PaymentProcessor, RandomApproval, SimulatedProcessor,
        SubmissionOutcome, TransactionIdSource, ValidatedPayment,
    };

    // === Errors ===
    pub use crate::core::error::{
        DonateError, GatewayError, SubmissionError, UserMessage, ValidationError,
    };

    // === Events ===
    pub use crate::core::events::{EventBus, EventEnvelope, FlowEvent};

    // === Gateway ===
    #[cfg(feature = "http-gateway")]
    pub use crate::gateway::HttpGateway;
    pub use crate::gateway::{
        MockGateway, PaymentGateway, PaymentIntentRequest, PaymentIntentResponse,
    };

    // === Capture ===
    pub use crate::capture::{CaptureDevice, CaptureError, Recording, RecordingSession};

    // === Config ===
    pub use crate::config::{DonateConfig, GatewayConfig, ProcessingConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use rust_decimal::Decimal;
}
