//! Processing fee calculation
//!
//! The donor covers the card-processing surcharge: a percentage of the amount
//! plus a fixed per-transaction part, rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Fee and total derived from a donation amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub fee: Decimal,
    pub total: Decimal,
}

impl FeeBreakdown {
    /// Breakdown shown while no amount is selected
    pub const ZERO: FeeBreakdown = FeeBreakdown {
        fee: Decimal::ZERO,
        total: Decimal::ZERO,
    };
}

/// Percentage + fixed surcharge passed to the donor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fraction of the amount (0.029 for 2.9%)
    pub rate: Decimal,

    /// Fixed part per transaction, in dollars
    pub fixed: Decimal,
}

impl FeeSchedule {
    /// Compute fee and total for `amount`
    ///
    /// Callers validate the amount first; a non-positive amount yields a
    /// meaningless breakdown rather than a panic.
    pub fn compute(&self, amount: Decimal) -> FeeBreakdown {
        let fee = round2(
            amount
                .checked_mul(self.rate)
                .and_then(|v| v.checked_add(self.fixed))
                .unwrap_or(Decimal::ZERO),
        );
        let total = round2(amount.checked_add(fee).unwrap_or(Decimal::ZERO));
        FeeBreakdown { fee, total }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rate: Decimal::new(29, 3),
            fixed: Decimal::new(30, 2),
        }
    }
}

/// Compute fees with the standard 2.9% + $0.30 schedule
pub fn compute_fees(amount: Decimal) -> FeeBreakdown {
    FeeSchedule::default().compute(amount)
}

/// Round to cents, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
