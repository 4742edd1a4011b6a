//! Costs

use rust_decimal::Decimal;
use thiserror::Error;

use crate::bom::LineItem;

/// Errors raised while aggregating costs.
#[derive(Debug, Error, PartialEq)]
pub enum CostError {
    /// The aggregated cost is too large to represent.
    #[error("material cost is out of range")]
    OutOfRange,
}

/// Sum of the line item subtotals.
///
/// # Errors
///
/// Returns [`CostError::OutOfRange`] if the sum overflows.
pub fn materials_cost(lines: &[LineItem]) -> Result<Decimal, CostError> {
    lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        sum.checked_add(line.subtotal()).ok_or(CostError::OutOfRange)
    })
}

/// Total material cost of an order: line item subtotals plus the charged offcut.
///
/// # Errors
///
/// Returns [`CostError::OutOfRange`] if the total overflows.
pub fn total_cost(lines: &[LineItem], offcut_cost: Decimal) -> Result<Decimal, CostError> {
    materials_cost(lines)?
        .checked_add(offcut_cost)
        .ok_or(CostError::OutOfRange)
}
