//! Payment form validation and submission outcomes
//!
//! The form is validated field by field in a fixed order and only the first
//! failure is reported, mirroring how the payment screen alerts the donor one
//! problem at a time.

pub mod format;
pub mod processor;

pub use processor::{
    ApprovalPolicy, ChargeError, ChargeRequest, ClockTransactionIds, PaymentProcessor,
    RandomApproval, SimulatedProcessor, TransactionIdSource,
};

use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw contents of the payment form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub cardholder_name: String,
    pub email: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl PaymentForm {
    /// Check every field in order, stopping at the first problem
    ///
    /// Consumes the form: card details are not kept around once a submission
    /// attempt starts.
    pub fn validate(self) -> Result<ValidatedPayment, ValidationError> {
        if self.cardholder_name.trim().is_empty() {
            return Err(ValidationError::MissingCardholderName);
        }

        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }

        let card_digits = format::strip_whitespace(&self.card_number);
        if !is_digits(&card_digits) || !(15..=16).contains(&card_digits.len()) {
            return Err(ValidationError::InvalidCardNumber);
        }

        if self.expiry.chars().count() != 5 || !self.expiry.contains('/') {
            return Err(ValidationError::InvalidExpiry);
        }

        if !is_digits(&self.cvv) || !(3..=4).contains(&self.cvv.len()) {
            return Err(ValidationError::InvalidCvv);
        }

        Ok(ValidatedPayment {
            email: email.to_string(),
            card_last4: card_digits[card_digits.len() - 4..].to_string(),
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// What survives validation: the contact email and the card's last four digits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub email: String,
    pub card_last4: String,
}

/// Proof of a successful charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeReceipt {
    pub transaction_id: String,
    /// Contact email the charge was made with
    pub email: String,
    pub card_last4: String,
}

/// Why a charge did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The payment was declined
    Declined,
    /// Something went wrong while processing
    Unexpected,
    /// The processor did not answer in time
    Timeout,
}

impl FailureReason {
    pub fn title(&self) -> &'static str {
        match self {
            FailureReason::Declined => "Payment Failed",
            FailureReason::Unexpected => "Error",
            FailureReason::Timeout => "Payment Timed Out",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FailureReason::Declined => {
                "Your payment could not be processed. Please check your card details and try again."
            }
            FailureReason::Unexpected => "An unexpected error occurred. Please try again.",
            FailureReason::Timeout => {
                "The payment service did not respond in time. Please try again."
            }
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of one submission attempt
///
/// Not `Clone`: the screen that asked for it consumes it once.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success(ChargeReceipt),
    Failure { reason: FailureReason },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PaymentForm {
        PaymentForm {
            cardholder_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry: "12/25".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_valid_form_yields_last4() {
        let validated = valid_form().validate().unwrap();
        assert_eq!(validated.card_last4, "4242");
        assert_eq!(validated.email, "jane@example.com");
    }

    #[test]
    fn test_blank_name_rejected() {
        let form = PaymentForm {
            cardholder_name: "   ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingCardholderName));
    }

    #[test]
    fn test_email_requires_at_sign() {
        let form = PaymentForm {
            email: "jane.example.com".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));

        let form = PaymentForm {
            email: "  ".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_card_number_length() {
        let with_card = |number: &str| PaymentForm {
            card_number: number.to_string(),
            ..valid_form()
        };

        assert_eq!(
            with_card("12345678901234").validate(),
            Err(ValidationError::InvalidCardNumber)
        );
        assert_eq!(
            with_card("378282246310005").validate().unwrap().card_last4,
            "0005"
        );
        assert_eq!(
            with_card("4000056655665556").validate().unwrap().card_last4,
            "5556"
        );
        assert_eq!(
            with_card("4242-4242-4242-4242").validate(),
            Err(ValidationError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_expiry_needs_slash() {
        let form = PaymentForm {
            expiry: "1225".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidExpiry));
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_cvv_length() {
        for (cvv, ok) in [("12", false), ("123", true), ("1234", true), ("12345", false), ("12a", false)] {
            let form = PaymentForm {
                cvv: cvv.to_string(),
                ..valid_form()
            };
            assert_eq!(form.validate().is_ok(), ok, "cvv {:?}", cvv);
        }
    }

    #[test]
    fn test_first_failing_check_wins() {
        let form = PaymentForm {
            cardholder_name: String::new(),
            email: "nope".to_string(),
            card_number: "1".to_string(),
            expiry: String::new(),
            cvv: String::new(),
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingCardholderName));

        let form = PaymentForm {
            card_number: "1".to_string(),
            cvv: "1".to_string(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(ValidationError::InvalidCardNumber));
    }

    #[test]
    fn test_failure_reason_messages() {
        assert!(FailureReason::Declined.to_string().contains("could not be processed"));
        assert_eq!(FailureReason::Unexpected.title(), "Error");
    }

    #[test]
    fn test_form_deserializes_from_camel_case() {
        let form: PaymentForm = serde_json::from_value(serde_json::json!({
            "cardholderName": "Jane Doe",
            "email": "jane@example.com",
            "cardNumber": "4242424242424242",
            "expiry": "01/30",
            "cvv": "999"
        }))
        .unwrap();
        assert!(form.validate().is_ok());
    }
}
