//! Pricing
//!
//! Turns a total material cost into a sale price and reconciles the discount
//! and surcharge the operator applied to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bom::LineItem;

pub mod adjustments;

pub use adjustments::{AdjustmentDriver, PricingAdjustment, ResolvedAdjustment};

/// Errors raised while pricing a quote.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Markup is zero or negative, or prices the order out of range.
    #[error("invalid markup {0}; must be greater than zero and keep prices in range")]
    InvalidMarkup(Decimal),

    /// Discount or surcharge is negative, or out of range against the base.
    #[error("invalid adjustment {0}; must not be negative and keep prices in range")]
    InvalidAdjustment(Decimal),
}

/// Multiplier from material cost to sale price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markup(Decimal);

impl Markup {
    /// Create a markup.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidMarkup`] unless `value` is greater than zero.
    pub fn new(value: Decimal) -> Result<Self, PricingError> {
        if value > Decimal::ZERO {
            Ok(Markup(value))
        } else {
            Err(PricingError::InvalidMarkup(value))
        }
    }

    /// Multiplier value.
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Apply the markup to a cost.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidMarkup`] if the marked-up cost overflows.
    pub fn apply(self, cost: Decimal) -> Result<Decimal, PricingError> {
        cost.checked_mul(self.0).ok_or(PricingError::InvalidMarkup(self.0))
    }
}

/// What discount and surcharge percentages are expressed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentBase {
    /// The sale price, `total_cost * markup`, offcut included.
    #[default]
    SalePrice,

    /// The markup-applied line subtotals the customer sees, offcut excluded.
    LineSubtotals,
}

impl AdjustmentBase {
    /// Amount adjustments are measured against.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidMarkup`] if the marked-up subtotals overflow.
    pub fn amount(
        self,
        lines: &[LineItem],
        sale_price: Decimal,
        markup: Markup,
    ) -> Result<Decimal, PricingError> {
        match self {
            AdjustmentBase::SalePrice => Ok(sale_price),
            AdjustmentBase::LineSubtotals => lines.iter().try_fold(Decimal::ZERO, |sum, line| {
                markup
                    .apply(line.subtotal())?
                    .checked_add(sum)
                    .ok_or(PricingError::InvalidMarkup(markup.value()))
            }),
        }
    }
}

/// Sale-side figures of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceReconciliation {
    /// `total_cost * markup`
    pub sale_price: Decimal,

    /// Amount the adjustments were resolved against
    pub base: Decimal,

    /// Resolved discount
    pub discount: ResolvedAdjustment,

    /// Resolved surcharge
    pub surcharge: ResolvedAdjustment,

    /// `base - discount + surcharge`
    pub final_price: Decimal,

    /// Margin in percentage points of the sale price
    pub margin_percentage: Decimal,
}

/// Margin of `sale_price` over `cost` in percentage points; zero for a zero sale price.
///
/// `None` if the margin is too large to represent.
pub fn margin_percentage(cost: Decimal, sale_price: Decimal) -> Option<Decimal> {
    if sale_price.is_zero() {
        return Some(Decimal::ZERO);
    }

    sale_price
        .checked_sub(cost)?
        .checked_div(sale_price)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Price a quote from its cost.
///
/// # Errors
///
/// - [`PricingError::InvalidMarkup`]: the markup prices the order out of range.
/// - [`PricingError::InvalidAdjustment`]: the discount or surcharge is negative,
///   or pushes the final price out of range.
pub fn reconcile(
    total_cost: Decimal,
    lines: &[LineItem],
    markup: Markup,
    base: AdjustmentBase,
    discount: &PricingAdjustment,
    surcharge: &PricingAdjustment,
) -> Result<PriceReconciliation, PricingError> {
    let sale_price = markup.apply(total_cost)?;
    let base = base.amount(lines, sale_price, markup)?;

    let discount = discount.resolve(base)?;
    let surcharge = surcharge.resolve(base)?;

    let final_price = base
        .checked_sub(discount.absolute())
        .ok_or(PricingError::InvalidAdjustment(discount.absolute()))?
        .checked_add(surcharge.absolute())
        .ok_or(PricingError::InvalidAdjustment(surcharge.absolute()))?;

    let margin_percentage = margin_percentage(total_cost, sale_price)
        .ok_or(PricingError::InvalidMarkup(markup.value()))?;

    Ok(PriceReconciliation {
        sale_price,
        base,
        discount,
        surcharge,
        final_price,
        margin_percentage,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        materials::{MaterialReference, UnitOfMeasure},
        selections::Category,
    };

    fn markup(value: i64) -> Result<Markup, PricingError> {
        Markup::new(Decimal::from(value))
    }

    #[test]
    fn markup_must_be_positive() {
        assert_eq!(
            Markup::new(Decimal::ZERO),
            Err(PricingError::InvalidMarkup(Decimal::ZERO))
        );
        assert_eq!(
            Markup::new(Decimal::NEGATIVE_ONE),
            Err(PricingError::InvalidMarkup(Decimal::NEGATIVE_ONE))
        );
    }

    #[test]
    fn ten_percent_off_three_times_markup() -> TestResult {
        let priced = reconcile(
            Decimal::from(100),
            &[],
            markup(3)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::percentage(Decimal::TEN),
            &PricingAdjustment::none(),
        )?;

        assert_eq!(priced.sale_price, Decimal::from(300));
        assert_eq!(priced.base, Decimal::from(300));
        assert_eq!(priced.discount.absolute(), Decimal::from(30));
        assert_eq!(priced.final_price, Decimal::from(270));

        Ok(())
    }

    #[test]
    fn surcharge_adds_to_final_price() -> TestResult {
        let priced = reconcile(
            Decimal::from(100),
            &[],
            markup(2)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::value(Decimal::from(20)),
            &PricingAdjustment::percentage(Decimal::from(5)),
        )?;

        assert_eq!(priced.discount.percentage(), Decimal::TEN);
        assert_eq!(priced.surcharge.absolute(), Decimal::TEN);
        assert_eq!(priced.final_price, Decimal::from(190));

        Ok(())
    }

    #[test]
    fn zero_cost_has_zero_margin_and_price() -> TestResult {
        let priced = reconcile(
            Decimal::ZERO,
            &[],
            markup(3)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::percentage(Decimal::from(50)),
            &PricingAdjustment::value(Decimal::from(10)),
        )?;

        assert_eq!(priced.sale_price, Decimal::ZERO);
        assert_eq!(priced.margin_percentage, Decimal::ZERO);
        assert_eq!(priced.discount.absolute(), Decimal::ZERO);
        assert_eq!(priced.surcharge.absolute(), Decimal::ZERO);
        assert_eq!(priced.final_price, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn margin_of_three_times_markup() -> TestResult {
        let margin = margin_percentage(Decimal::from(100), Decimal::from(300))
            .ok_or("margin should be representable")?;

        assert_eq!(margin.round_dp(4), Decimal::new(666_667, 4));

        Ok(())
    }

    #[test]
    fn line_subtotal_base_excludes_offcut() -> TestResult {
        let glass = MaterialReference::new("VID", "Glass", UnitOfMeasure::Unit, Decimal::from(40));
        let lines = [LineItem::new(Category::Glass, &glass, Decimal::ONE)?];

        // 40 of glass plus 10 of offcut
        let priced = reconcile(
            Decimal::from(50),
            &lines,
            markup(3)?,
            AdjustmentBase::LineSubtotals,
            &PricingAdjustment::percentage(Decimal::TEN),
            &PricingAdjustment::none(),
        )?;

        assert_eq!(priced.sale_price, Decimal::from(150));
        assert_eq!(priced.base, Decimal::from(120));
        assert_eq!(priced.discount.absolute(), Decimal::from(12));
        assert_eq!(priced.final_price, Decimal::from(108));

        Ok(())
    }

    #[test]
    fn negative_discount_is_rejected() -> TestResult {
        let result = reconcile(
            Decimal::from(100),
            &[],
            markup(3)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::value(Decimal::NEGATIVE_ONE),
            &PricingAdjustment::none(),
        );

        assert_eq!(
            result,
            Err(PricingError::InvalidAdjustment(Decimal::NEGATIVE_ONE))
        );

        Ok(())
    }

    #[test]
    fn markup_that_overflows_the_sale_price_is_rejected() -> TestResult {
        let huge = Decimal::from_scientific("1e27")?;

        let result = reconcile(
            Decimal::from(100),
            &[],
            Markup::new(huge)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::none(),
            &PricingAdjustment::none(),
        );

        assert_eq!(result, Err(PricingError::InvalidMarkup(huge)));

        Ok(())
    }

    #[test]
    fn surcharge_that_overflows_the_final_price_is_rejected() -> TestResult {
        let result = reconcile(
            Decimal::from(100),
            &[],
            markup(3)?,
            AdjustmentBase::SalePrice,
            &PricingAdjustment::none(),
            &PricingAdjustment::value(Decimal::MAX),
        );

        assert_eq!(result, Err(PricingError::InvalidAdjustment(Decimal::MAX)));

        Ok(())
    }

    #[test]
    fn tiny_markup_with_unrepresentable_margin_is_rejected() {
        // about -1e29 percentage points
        assert_eq!(margin_percentage(Decimal::ONE, Decimal::new(1, 27)), None);
    }
}
