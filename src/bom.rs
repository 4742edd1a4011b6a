//! Bill of Materials

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::Serialize;
use thiserror::Error;

use crate::{
    geometry::GeometryResult,
    materials::{MaterialCatalog, MaterialReference, PaymentTerm, UnitOfMeasure},
    selections::{Category, MaterialSelections, Selection, SelectionRequest},
};

/// Errors raised while resolving material selections.
#[derive(Debug, Error, PartialEq)]
pub enum BomError {
    /// The catalog has no material with this id.
    #[error("material {0} not found in catalog")]
    MaterialNotFound(String),

    /// A single-choice category was supplied more than once.
    #[error("category {0} selected more than once")]
    DuplicateSelection(Category),

    /// The material has no cost for the payment term nor a cash cost.
    #[error("material {material} has no unit cost for {term}")]
    MissingUnitCost {
        /// Catalog id
        material: String,
        /// Requested payment term
        term: PaymentTerm,
    },

    /// A line quantity or subtotal is too large to represent.
    #[error("line for material {0} is out of range")]
    LineOutOfRange(String),
}

/// One priced row of the bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    category: Category,
    material_id: String,
    description: String,
    quantity: Decimal,
    unit: UnitOfMeasure,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl LineItem {
    /// Price `quantity` of `material`.
    ///
    /// # Errors
    ///
    /// Returns [`BomError::LineOutOfRange`] if the subtotal overflows.
    pub fn new(
        category: Category,
        material: &MaterialReference,
        quantity: Decimal,
    ) -> Result<Self, BomError> {
        let subtotal = quantity
            .checked_mul(material.unit_price)
            .ok_or_else(|| BomError::LineOutOfRange(material.id.clone()))?;

        Ok(Self {
            category,
            material_id: material.id.clone(),
            description: material.description.clone(),
            quantity,
            unit: material.unit,
            unit_price: material.unit_price,
            subtotal,
        })
    }

    /// Category
    pub fn category(&self) -> Category {
        self.category
    }

    /// Catalog id
    pub fn material_id(&self) -> &str {
        &self.material_id
    }

    /// Description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Quantity consumed, in [`LineItem::unit`]s
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Unit of measure
    pub fn unit(&self) -> UnitOfMeasure {
        self.unit
    }

    /// Unit price
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `quantity * unit_price`
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

/// Resolve order form rows against the catalog.
///
/// Rows that are switched off or have no material chosen leave their category
/// disabled.
///
/// # Errors
///
/// - [`BomError::DuplicateSelection`]: a single-choice category appears twice.
/// - [`BomError::MaterialNotFound`]: a chosen id is unknown to the catalog.
/// - [`BomError::MissingUnitCost`]: a chosen material has no usable cost.
pub fn resolve_selections(
    requests: &[SelectionRequest],
    catalog: &impl MaterialCatalog,
    term: PaymentTerm,
) -> Result<MaterialSelections, BomError> {
    let mut seen = FxHashSet::default();
    let mut selections = MaterialSelections::new();

    for request in requests {
        if !request.category.is_repeatable() && !seen.insert(request.category) {
            return Err(BomError::DuplicateSelection(request.category));
        }

        let Some(id) = request.chosen_material() else {
            continue;
        };

        let material = catalog
            .material(id)
            .ok_or_else(|| BomError::MaterialNotFound(id.to_string()))?;

        let reference = material
            .reference(term)
            .ok_or_else(|| BomError::MissingUnitCost {
                material: id.to_string(),
                term,
            })?;

        selections.set(request.category, Selection::Enabled(reference));
    }

    Ok(selections)
}

/// Price every enabled selection for `quantity` pieces measuring `geometry`.
///
/// Mouldings are charged for the perimeter; the offcut of the last bar is left
/// to the cost aggregator.
///
/// # Errors
///
/// Returns [`BomError::LineOutOfRange`] if a line quantity or subtotal overflows.
pub fn line_items(
    selections: &MaterialSelections,
    geometry: &GeometryResult,
    quantity: u32,
) -> Result<Vec<LineItem>, BomError> {
    let pieces = Decimal::from(quantity);

    selections
        .iter()
        .map(|(category, material)| {
            let consumed = consumption(material.unit, geometry)
                .checked_mul(pieces)
                .ok_or_else(|| BomError::LineOutOfRange(material.id.clone()))?;

            LineItem::new(category, material, consumed)
        })
        .collect()
}

/// Amount of a material one piece consumes.
fn consumption(unit: UnitOfMeasure, geometry: &GeometryResult) -> Decimal {
    match unit {
        UnitOfMeasure::Linear => geometry.perimeter(),
        UnitOfMeasure::Area => geometry.area_square_metres(),
        UnitOfMeasure::Unit => Decimal::ONE,
    }
}
