//! Amount selection state machine
//!
//! [`DonationFlow`] is a plain value: every transition consumes the current
//! flow and returns the next one, so the amount-entry screen can hold it in
//! whatever state container it likes and tests can drive it without any UI.
//!
//! ```text
//!                 select_preset            update_custom_text(valid)
//! NoSelection ───────────────▶ PresetSelected   CustomEntering ──────────▶ CustomSelected
//!      ▲                             │                ▲   ▲                       │
//!      │ reset (from any state)      │ enter_custom   │   └── update(invalid) ────┘
//!      └─────────────────────────────┴────────────────┘
//! ```
//!
//! Fee and total are derived from the selected amount on every read and are
//! never stored on their own.

use super::error::ValidationError;
use super::fees::{FeeBreakdown, FeeSchedule};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A strictly positive donation amount in dollars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DonationAmount(Decimal);

impl DonationAmount {
    /// Wrap `value` if it is greater than zero
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for DonationAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl<'de> Deserialize<'de> for DonationAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        DonationAmount::new(value)
            .ok_or_else(|| serde::de::Error::custom("donation amount must be positive"))
    }
}

/// Inclusive bounds checked when an amount is finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountLimits {
    /// Minimum donation
    pub minimum: Decimal,

    /// Maximum single-transaction amount
    pub maximum: Decimal,
}

impl AmountLimits {
    pub fn check(&self, amount: DonationAmount) -> Result<(), ValidationError> {
        let value = amount.value();
        if value < self.minimum {
            return Err(ValidationError::BelowMinimum {
                amount: value,
                minimum: self.minimum,
            });
        }
        if value > self.maximum {
            return Err(ValidationError::ExceedsMaximum {
                amount: value,
                maximum: self.maximum,
            });
        }
        Ok(())
    }
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self {
            minimum: Decimal::new(100, 2),
            maximum: Decimal::new(1_000_000, 2),
        }
    }
}

/// Where the donor is in choosing an amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSelection {
    NoSelection,
    PresetSelected(DonationAmount),
    /// Custom mode with text that is not (yet) a usable amount
    CustomEntering(String),
    CustomSelected {
        text: String,
        amount: DonationAmount,
    },
}

/// Amount selection plus the fee schedule used to price it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationFlow {
    selection: AmountSelection,
    schedule: FeeSchedule,
}

impl DonationFlow {
    /// Start a flow with the standard fee schedule
    pub fn new() -> Self {
        Self::with_schedule(FeeSchedule::default())
    }

    pub fn with_schedule(schedule: FeeSchedule) -> Self {
        Self {
            selection: AmountSelection::NoSelection,
            schedule,
        }
    }

    pub fn selection(&self) -> &AmountSelection {
        &self.selection
    }

    /// Tap a one-tap preset; drops any custom text
    pub fn select_preset(self, amount: DonationAmount) -> Self {
        self.with_selection(AmountSelection::PresetSelected(amount))
    }

    /// Switch to free-text entry; drops any preset
    pub fn enter_custom_mode(self) -> Self {
        self.with_selection(AmountSelection::CustomEntering(String::new()))
    }

    /// Apply the latest contents of the custom amount field
    pub fn update_custom_text(self, text: &str) -> Self {
        let selection = match sanitize_amount_text(text) {
            Ok(clean) => match parse_amount(&clean) {
                Some(amount) => AmountSelection::CustomSelected {
                    text: clean,
                    amount,
                },
                None => AmountSelection::CustomEntering(clean),
            },
            Err(_) => AmountSelection::CustomEntering(strip_disallowed(text)),
        };
        self.with_selection(selection)
    }

    /// Back to a blank slate
    pub fn reset(self) -> Self {
        self.with_selection(AmountSelection::NoSelection)
    }

    /// The currently selected amount, if any
    pub fn amount(&self) -> Option<DonationAmount> {
        match &self.selection {
            AmountSelection::PresetSelected(amount) => Some(*amount),
            AmountSelection::CustomSelected { amount, .. } => Some(*amount),
            AmountSelection::NoSelection | AmountSelection::CustomEntering(_) => None,
        }
    }

    /// Text shown in the custom field, if custom mode is active
    pub fn custom_text(&self) -> Option<&str> {
        match &self.selection {
            AmountSelection::CustomEntering(text) => Some(text),
            AmountSelection::CustomSelected { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Fee and total for the current amount, zero without one
    pub fn fees(&self) -> FeeBreakdown {
        self.amount()
            .map(|amount| self.schedule.compute(amount.value()))
            .unwrap_or(FeeBreakdown::ZERO)
    }

    /// Lock in the amount and produce the payment screen hand-off
    pub fn finalize(&self, limits: &AmountLimits) -> Result<FinalizedDonation, ValidationError> {
        let amount = self.amount().ok_or(ValidationError::NoAmountSelected)?;
        limits.check(amount)?;
        let fees = self.schedule.compute(amount.value());

        Ok(FinalizedDonation {
            donation_amount: amount,
            processing_fee: fees.fee,
            total_charge: fees.total,
        })
    }

    fn with_selection(self, selection: AmountSelection) -> Self {
        Self { selection, ..self }
    }
}

impl Default for DonationFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Amount, fee and total handed to the payment step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedDonation {
    donation_amount: DonationAmount,
    processing_fee: Decimal,
    total_charge: Decimal,
}

impl FinalizedDonation {
    pub fn donation_amount(&self) -> DonationAmount {
        self.donation_amount
    }

    pub fn processing_fee(&self) -> Decimal {
        self.processing_fee
    }

    pub fn total_charge(&self) -> Decimal {
        self.total_charge
    }
}

fn strip_disallowed(text: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let regex = DISALLOWED.get_or_init(|| Regex::new(r"[^0-9.]").unwrap());
    regex.replace_all(text, "").into_owned()
}

/// Keep digits and the decimal separator
///
/// Input with more than one separator is rejected as a whole.
pub fn sanitize_amount_text(text: &str) -> Result<String, ValidationError> {
    let clean = strip_disallowed(text);
    if clean.matches('.').count() > 1 {
        return Err(ValidationError::MalformedAmount { text: clean });
    }
    Ok(clean)
}

fn parse_amount(clean: &str) -> Option<DonationAmount> {
    let normalized = clean.strip_suffix('.').unwrap_or(clean);
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else {
        normalized.to_string()
    };
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized)
        .ok()
        .and_then(DonationAmount::new)
}
