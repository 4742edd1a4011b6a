//! Geometry
//!
//! Turns the frame's outer dimensions into the quantities the bill of materials
//! is priced from: area for glass and backing, perimeter for the moulding and
//! the number of whole bars the moulding has to be cut from.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use thiserror::Error;

/// Square centimetres in one square metre.
const SQUARE_CM_PER_SQUARE_M: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Errors raised while measuring a frame.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// Height or width is zero or negative.
    #[error("invalid dimensions {height} x {width}; both must be greater than zero")]
    InvalidDimension {
        /// Requested height
        height: Decimal,
        /// Requested width
        width: Decimal,
    },

    /// Bar length is zero or negative, or so small the bar count overflows.
    #[error("invalid bar length {0}; must be greater than zero")]
    InvalidBarLength(Decimal),

    /// Dimensions too large to represent.
    #[error("dimensions {height} x {width} are out of range")]
    OutOfRange {
        /// Requested height
        height: Decimal,
        /// Requested width
        width: Decimal,
    },

    /// Offcut cost too large to represent.
    #[error("offcut of {length} cm at {unit_cost} per cm is out of range")]
    OffcutOutOfRange {
        /// Offcut length
        length: Decimal,
        /// Moulding cost per centimetre
        unit_cost: Decimal,
    },
}

/// Measurements of a single framed piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeometryResult {
    area: Decimal,
    perimeter: Decimal,
    bar_length: Decimal,
    bars_required: u32,
    offcut_length: Decimal,
    offcut_cost: Decimal,
}

impl GeometryResult {
    /// Area in square centimetres (`height * width`).
    pub fn area(&self) -> Decimal {
        self.area
    }

    /// Area in square metres, the unit area-priced materials are sold in.
    pub fn area_square_metres(&self) -> Decimal {
        self.area / SQUARE_CM_PER_SQUARE_M
    }

    /// Perimeter in centimetres (`2 * (height + width)`).
    pub fn perimeter(&self) -> Decimal {
        self.perimeter
    }

    /// Length of one bar of moulding.
    pub fn bar_length(&self) -> Decimal {
        self.bar_length
    }

    /// Smallest number of whole bars covering the perimeter.
    pub fn bars_required(&self) -> u32 {
        self.bars_required
    }

    /// Moulding left over after cutting the perimeter from the bars.
    pub fn offcut_length(&self) -> Decimal {
        self.offcut_length
    }

    /// Cost of the offcut at the moulding's linear unit cost.
    pub fn offcut_cost(&self) -> Decimal {
        self.offcut_cost
    }

    /// Attach the moulding's cost per centimetre, pricing the offcut.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::OffcutOutOfRange`] if the offcut cost overflows.
    pub fn priced(self, linear_unit_cost: Decimal) -> Result<Self, GeometryError> {
        let offcut_cost = self
            .offcut_length
            .checked_mul(linear_unit_cost)
            .ok_or(GeometryError::OffcutOutOfRange {
                length: self.offcut_length,
                unit_cost: linear_unit_cost,
            })?;

        Ok(Self {
            offcut_cost,
            ..self
        })
    }
}

/// Measure a piece of `height` by `width` framed from bars of `bar_length`.
///
/// The offcut cost of the result is zero until [`GeometryResult::priced`] is called.
///
/// # Errors
///
/// - [`GeometryError::InvalidDimension`]: height or width is not positive.
/// - [`GeometryError::InvalidBarLength`]: bar length is not positive.
/// - [`GeometryError::OutOfRange`]: the dimensions overflow decimal arithmetic.
pub fn measure(
    height: Decimal,
    width: Decimal,
    bar_length: Decimal,
) -> Result<GeometryResult, GeometryError> {
    if height <= Decimal::ZERO || width <= Decimal::ZERO {
        return Err(GeometryError::InvalidDimension { height, width });
    }

    if bar_length <= Decimal::ZERO {
        return Err(GeometryError::InvalidBarLength(bar_length));
    }

    let out_of_range = || GeometryError::OutOfRange { height, width };

    let area = height.checked_mul(width).ok_or_else(out_of_range)?;
    let perimeter = height
        .checked_add(width)
        .and_then(|half| half.checked_mul(Decimal::TWO))
        .ok_or_else(out_of_range)?;

    let bars = perimeter
        .checked_div(bar_length)
        .map(|bars| bars.ceil())
        .ok_or(GeometryError::InvalidBarLength(bar_length))?;

    let bars_required = bars
        .to_u32()
        .ok_or(GeometryError::InvalidBarLength(bar_length))?;

    let offcut_length = bars
        .checked_mul(bar_length)
        .map(|stock| stock - perimeter)
        .ok_or(GeometryError::InvalidBarLength(bar_length))?;

    Ok(GeometryResult {
        area,
        perimeter,
        bar_length,
        bars_required,
        offcut_length,
        offcut_cost: Decimal::ZERO,
    })
}
