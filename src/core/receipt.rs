//! Confirmation record shown after a successful donation

use super::flow::{DonationAmount, FinalizedDonation};
use super::payment::ChargeReceipt;
use rust_decimal::Decimal;
use serde::Serialize;

const SHARE_TITLE: &str = "I just made a donation!";
const SHARE_HASHTAGS: &str = "#KindStream #MiniPhilanthropist";

/// Immutable receipt for the confirmation screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRecord {
    donation_amount: DonationAmount,
    processing_fee: Decimal,
    total_charge: Decimal,
    email: String,
    transaction_id: String,
    card_last4: String,
}

impl ConfirmationRecord {
    /// Combine a successful charge with the donation it paid for
    pub fn assemble(donation: &FinalizedDonation, receipt: ChargeReceipt) -> Self {
        Self {
            donation_amount: donation.donation_amount(),
            processing_fee: donation.processing_fee(),
            total_charge: donation.total_charge(),
            email: receipt.email,
            transaction_id: receipt.transaction_id,
            card_last4: receipt.card_last4,
        }
    }

    pub fn donation_amount(&self) -> DonationAmount {
        self.donation_amount
    }

    pub fn processing_fee(&self) -> Decimal {
        self.processing_fee
    }

    pub fn total_charge(&self) -> Decimal {
        self.total_charge
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn card_last4(&self) -> &str {
        &self.card_last4
    }

    /// Card number as displayed on the receipt
    pub fn masked_card(&self) -> String {
        format!("•••• •••• •••• {}", self.card_last4)
    }

    pub fn share_title(&self) -> &'static str {
        SHARE_TITLE
    }

    /// Text for the "Share Your Impact" action
    pub fn share_message(&self) -> String {
        format!(
            "I just donated {} to make a difference! Join me in giving back. Every contribution matters. {}",
            self.donation_amount, SHARE_HASHTAGS
        )
    }

    /// Hand-off to the optional video message step
    pub fn recording_invite(&self) -> RecordingInvite {
        RecordingInvite {
            donation_amount: self.donation_amount,
            transaction_id: self.transaction_id.clone(),
        }
    }
}

/// Parameters for recording a thank-you video after donating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInvite {
    pub donation_amount: DonationAmount,
    pub transaction_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flow::{AmountLimits, DonationFlow};
    use std::str::FromStr;

    fn record() -> ConfirmationRecord {
        let donation = DonationFlow::new()
            .enter_custom_mode()
            .update_custom_text("12.5")
            .finalize(&AmountLimits::default())
            .unwrap();
        ConfirmationRecord::assemble(
            &donation,
            ChargeReceipt {
                transaction_id: "TXN1".to_string(),
                email: "jane@example.com".to_string(),
                card_last4: "0005".to_string(),
            },
        )
    }

    #[test]
    fn test_assemble_copies_exact_values() {
        let record = record();
        assert_eq!(record.donation_amount().value(), Decimal::from_str("12.5").unwrap());
        assert_eq!(record.processing_fee(), Decimal::from_str("0.66").unwrap());
        assert_eq!(record.total_charge(), Decimal::from_str("13.16").unwrap());
        assert_eq!(record.email(), "jane@example.com");
        assert_eq!(record.transaction_id(), "TXN1");
        assert_eq!(record.card_last4(), "0005");
    }

    #[test]
    fn test_share_message() {
        assert_eq!(
            record().share_message(),
            "I just donated $12.50 to make a difference! Join me in giving back. \
             Every contribution matters. #KindStream #MiniPhilanthropist"
        );
        assert_eq!(record().share_title(), "I just made a donation!");
    }

    #[test]
    fn test_masked_card() {
        assert_eq!(record().masked_card(), "•••• •••• •••• 0005");
    }

    #[test]
    fn test_recording_invite() {
        let invite = record().recording_invite();
        assert_eq!(invite.transaction_id, "TXN1");

        let json = serde_json::to_value(&invite).unwrap();
        assert_eq!(json["transactionId"], "TXN1");
    }

    #[test]
    fn test_serializes_navigation_params() {
        let json = serde_json::to_value(record()).unwrap();
        for key in [
            "donationAmount",
            "processingFee",
            "totalCharge",
            "email",
            "transactionId",
            "cardLast4",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
