//! Adjustments
//!
//! A discount or surcharge is edited either as a percentage or as an absolute
//! value. Only the edited field is stored; the other one is derived from the
//! base whenever the adjustment is resolved, so the two can never drift apart.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PricingError;

/// Which field of an adjustment the operator last edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentDriver {
    /// The percentage was edited; the value is derived.
    Percentage,

    /// The value was edited; the percentage is derived.
    Value,
}

/// A discount or surcharge, stored as its driving field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingAdjustment {
    /// Percentage points of the base (10 means 10%).
    Percentage(Decimal),

    /// Absolute amount in the quote currency.
    Value(Decimal),
}

impl Default for PricingAdjustment {
    fn default() -> Self {
        PricingAdjustment::Percentage(Decimal::ZERO)
    }
}

impl PricingAdjustment {
    /// No adjustment.
    pub fn none() -> Self {
        Self::default()
    }

    /// Adjustment driven by percentage points.
    pub fn percentage(points: Decimal) -> Self {
        PricingAdjustment::Percentage(points)
    }

    /// Adjustment driven by an absolute value.
    pub fn value(amount: Decimal) -> Self {
        PricingAdjustment::Value(amount)
    }

    /// The field that drives this adjustment.
    pub fn driver(&self) -> AdjustmentDriver {
        match self {
            PricingAdjustment::Percentage(_) => AdjustmentDriver::Percentage,
            PricingAdjustment::Value(_) => AdjustmentDriver::Value,
        }
    }

    /// The stored driving value.
    pub fn driving_value(&self) -> Decimal {
        match self {
            PricingAdjustment::Percentage(value) | PricingAdjustment::Value(value) => *value,
        }
    }

    /// Derive both fields against `base`.
    ///
    /// A base of zero or less resolves to zero for both fields.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidAdjustment`] if the driving value is negative
    /// or the derived field overflows.
    pub fn resolve(&self, base: Decimal) -> Result<ResolvedAdjustment, PricingError> {
        let driving = self.driving_value();

        if driving < Decimal::ZERO {
            return Err(PricingError::InvalidAdjustment(driving));
        }

        let driver = self.driver();

        if base <= Decimal::ZERO {
            return Ok(ResolvedAdjustment {
                driver,
                percentage: Decimal::ZERO,
                absolute: Decimal::ZERO,
            });
        }

        let (percentage, absolute) = match self {
            PricingAdjustment::Percentage(points) => {
                let amount =
                    percent_of(*points, base).ok_or(PricingError::InvalidAdjustment(*points))?;

                (*points, amount)
            }
            PricingAdjustment::Value(amount) => {
                let points = amount
                    .checked_div(base)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .ok_or(PricingError::InvalidAdjustment(*amount))?;

                (points, *amount)
            }
        };

        Ok(ResolvedAdjustment {
            driver,
            percentage,
            absolute,
        })
    }
}

/// `points` percent of `base`, or `None` if it overflows.
fn percent_of(points: Decimal, base: Decimal) -> Option<Decimal> {
    points.checked_div(Decimal::ONE_HUNDRED)?.checked_mul(base)
}

/// An adjustment with both fields derived against a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedAdjustment {
    driver: AdjustmentDriver,
    percentage: Decimal,
    absolute: Decimal,
}

impl ResolvedAdjustment {
    /// Field the operator edited.
    pub fn driver(&self) -> AdjustmentDriver {
        self.driver
    }

    /// Percentage points of the base.
    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// Absolute amount.
    pub fn absolute(&self) -> Decimal {
        self.absolute
    }

    /// Percentage as a fraction.
    pub fn fraction(&self) -> Percentage {
        Percentage::from(self.percentage / Decimal::ONE_HUNDRED)
    }
}
