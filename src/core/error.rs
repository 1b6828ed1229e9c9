//! Typed error handling for the donation flow
//!
//! Every failure in the flow is recoverable: control returns to the user at the
//! step where it happened. Errors therefore carry what the presentation layer
//! needs to tell the donor what went wrong, not just a debug string.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: amount bounds, missing amount, malformed form fields
//! - [`SubmissionError`]: guards around the single in-flight submission
//! - [`GatewayError`]: failures from the payment-intent backend
//!
//! Payment declines are *not* errors: they resolve as
//! [`SubmissionOutcome::Failure`](crate::core::payment::SubmissionOutcome) after
//! the processing delay, which keeps "bad input" apart from "payment declined".
//!
//! # Example
//!
//! ```rust,ignore
//! use donate::prelude::*;
//!
//! match flow.finalize(&limits) {
//!     Ok(donation) => navigate_to_payment(donation),
//!     Err(ValidationError::BelowMinimum { minimum, .. }) => {
//!         println!("Donations start at ${}", minimum);
//!     }
//!     Err(e) => show_alert(e.to_user_message()),
//! }
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// The main error type for the donation flow
#[derive(Debug, Error)]
pub enum DonateError {
    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Submission guard errors
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Payment-intent backend errors
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl DonateError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DonateError::Validation(e) => e.error_code(),
            DonateError::Submission(e) => e.error_code(),
            DonateError::Gateway(e) => e.error_code(),
        }
    }

    /// Short alert title for this error
    pub fn title(&self) -> &'static str {
        match self {
            DonateError::Validation(e) => e.title(),
            DonateError::Submission(e) => e.title(),
            DonateError::Gateway(_) => "Error",
        }
    }

    /// Convert to a message the presentation layer can show as-is
    pub fn to_user_message(&self) -> UserMessage {
        UserMessage {
            code: self.error_code().to_string(),
            title: self.title().to_string(),
            message: self.to_string(),
        }
    }
}

/// User-facing error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    /// Error code for programmatic handling
    pub code: String,
    /// Alert title
    pub title: String,
    /// Human-readable message
    pub message: String,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised before anything is charged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Continue pressed without a valid amount
    #[error("Please select an amount")]
    NoAmountSelected,

    /// Amount is below the minimum donation
    #[error("Amount ${amount} is below the minimum donation of ${minimum}")]
    BelowMinimum { amount: Decimal, minimum: Decimal },

    /// Amount exceeds the single-transaction cap
    #[error("Amount ${amount} exceeds the maximum donation of ${maximum}")]
    ExceedsMaximum { amount: Decimal, maximum: Decimal },

    /// Free text that cannot become an amount
    #[error("'{text}' is not a valid amount")]
    MalformedAmount { text: String },

    /// Cardholder name is blank
    #[error("Please enter cardholder name")]
    MissingCardholderName,

    /// Email is blank or has no '@'
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// Card number is not 15 or 16 digits
    #[error("Please enter a valid card number")]
    InvalidCardNumber,

    /// Expiry is not MM/YY
    #[error("Please enter expiry date as MM/YY")]
    InvalidExpiry,

    /// CVV is not 3 or 4 digits
    #[error("Please enter a valid CVV")]
    InvalidCvv,
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::NoAmountSelected => "NO_AMOUNT_SELECTED",
            ValidationError::BelowMinimum { .. } => "AMOUNT_BELOW_MINIMUM",
            ValidationError::ExceedsMaximum { .. } => "AMOUNT_EXCEEDS_MAXIMUM",
            ValidationError::MalformedAmount { .. } => "MALFORMED_AMOUNT",
            ValidationError::MissingCardholderName => "MISSING_CARDHOLDER_NAME",
            ValidationError::InvalidEmail => "INVALID_EMAIL",
            ValidationError::InvalidCardNumber => "INVALID_CARD_NUMBER",
            ValidationError::InvalidExpiry => "INVALID_EXPIRY",
            ValidationError::InvalidCvv => "INVALID_CVV",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::NoAmountSelected => "Select Amount",
            ValidationError::BelowMinimum { .. } => "Minimum Donation",
            ValidationError::ExceedsMaximum { .. } => "Maximum Donation",
            ValidationError::MalformedAmount { .. } => "Invalid Amount",
            ValidationError::MissingCardholderName => "Missing Information",
            ValidationError::InvalidEmail => "Invalid Email",
            ValidationError::InvalidCardNumber => "Invalid Card",
            ValidationError::InvalidExpiry => "Invalid Expiry",
            ValidationError::InvalidCvv => "Invalid CVV",
        }
    }

    /// True for errors about the payment form rather than the amount
    pub fn is_form_error(&self) -> bool {
        matches!(
            self,
            ValidationError::MissingCardholderName
                | ValidationError::InvalidEmail
                | ValidationError::InvalidCardNumber
                | ValidationError::InvalidExpiry
                | ValidationError::InvalidCvv
        )
    }
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Errors from the per-flow submission guard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// A submission is already being processed for this flow
    #[error("A payment is already being processed")]
    InFlight,

    /// The flow was disposed; any late outcome is discarded
    #[error("The donation was cancelled")]
    Cancelled,
}

impl SubmissionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::InFlight => "SUBMISSION_IN_FLIGHT",
            SubmissionError::Cancelled => "SUBMISSION_CANCELLED",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SubmissionError::InFlight => "Processing",
            SubmissionError::Cancelled => "Cancelled",
        }
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors from the payment-intent backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend refused to create an intent
    #[error("Payment intent creation failed")]
    IntentCreationFailed,

    /// Non-success HTTP status from the backend
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Transport or decoding failure
    #[error("Payment backend unavailable: {message}")]
    Transport { message: String },
}

impl GatewayError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::IntentCreationFailed => "INTENT_CREATION_FAILED",
            GatewayError::Http { .. } => "GATEWAY_HTTP_ERROR",
            GatewayError::Transport { .. } => "GATEWAY_TRANSPORT_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_the_problem() {
        assert_eq!(
            ValidationError::InvalidCardNumber.to_string(),
            "Please enter a valid card number"
        );
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Please enter a valid email address"
        );
        assert_eq!(
            ValidationError::NoAmountSelected.to_string(),
            "Please select an amount"
        );
    }

    #[test]
    fn test_bound_errors_mention_bound() {
        let err = ValidationError::BelowMinimum {
            amount: Decimal::new(99, 2),
            minimum: Decimal::new(100, 2),
        };
        assert!(err.to_string().contains("below the minimum"));
        assert!(err.to_string().contains("$1.00"));

        let err = ValidationError::ExceedsMaximum {
            amount: Decimal::new(1_000_001, 2),
            maximum: Decimal::new(1_000_000, 2),
        };
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn test_donate_error_conversion_keeps_code() {
        let err: DonateError = ValidationError::InvalidCvv.into();
        assert_eq!(err.error_code(), "INVALID_CVV");
        assert_eq!(err.title(), "Invalid CVV");

        let err: DonateError = SubmissionError::InFlight.into();
        assert_eq!(err.error_code(), "SUBMISSION_IN_FLIGHT");
    }

    #[test]
    fn test_user_message_serialization() {
        let err: DonateError = ValidationError::InvalidExpiry.into();
        let json = serde_json::to_value(err.to_user_message()).unwrap();

        assert_eq!(json["code"], "INVALID_EXPIRY");
        assert_eq!(json["title"], "Invalid Expiry");
        assert_eq!(json["message"], "Please enter expiry date as MM/YY");
    }

    #[test]
    fn test_form_errors_are_distinguished_from_amount_errors() {
        assert!(ValidationError::InvalidEmail.is_form_error());
        assert!(!ValidationError::NoAmountSelected.is_form_error());
    }
}
