//! Orders

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    bom::{BomError, resolve_selections},
    materials::{MaterialCatalog, MaterialReference, PaymentTerm},
    pricing::PricingAdjustment,
    selections::{Category, MaterialSelections, Selection, SelectionRequest},
};

/// Kind of product being quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    /// Framed picture
    #[default]
    Picture,

    /// Framed mirror
    Mirror,

    /// Moulding sold without contents
    LooseFrame,

    /// Fine-art print, framed
    FineArt,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProductType::Picture => "Picture",
            ProductType::Mirror => "Mirror",
            ProductType::LooseFrame => "Loose frame",
            ProductType::FineArt => "Fine-art",
        };

        f.write_str(label)
    }
}

/// A framing job with its materials resolved, ready to be quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpecification {
    /// Product type
    pub product_type: ProductType,

    /// Height in centimetres
    pub height: Decimal,

    /// Width in centimetres
    pub width: Decimal,

    /// Number of identical pieces
    pub quantity: u32,

    /// Payment term the material prices were captured for
    pub payment_term: PaymentTerm,

    /// Markup override; the configured default applies when unset
    pub markup: Option<Decimal>,

    /// Material choices
    pub selections: MaterialSelections,

    /// Discount
    pub discount: PricingAdjustment,

    /// Surcharge
    pub surcharge: PricingAdjustment,
}

impl OrderSpecification {
    /// A single piece of `height` by `width` with nothing selected.
    pub fn new(product_type: ProductType, height: Decimal, width: Decimal) -> Self {
        Self {
            product_type,
            height,
            width,
            quantity: 1,
            payment_term: PaymentTerm::default(),
            markup: None,
            selections: MaterialSelections::new(),
            discount: PricingAdjustment::none(),
            surcharge: PricingAdjustment::none(),
        }
    }

    /// Set the number of pieces.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Override the markup.
    #[must_use]
    pub fn with_markup(mut self, markup: Decimal) -> Self {
        self.markup = Some(markup);
        self
    }

    /// Select a material for a category.
    #[must_use]
    pub fn with_material(mut self, category: Category, material: MaterialReference) -> Self {
        self.selections.set(category, Selection::Enabled(material));
        self
    }

    /// Set the discount.
    #[must_use]
    pub fn with_discount(mut self, discount: PricingAdjustment) -> Self {
        self.discount = discount;
        self
    }

    /// Set the surcharge.
    #[must_use]
    pub fn with_surcharge(mut self, surcharge: PricingAdjustment) -> Self {
        self.surcharge = surcharge;
        self
    }
}

/// An order as submitted by the order form, materials referenced by catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderRequest {
    /// Product type
    #[serde(default)]
    pub product_type: ProductType,

    /// Height in centimetres
    pub height: Decimal,

    /// Width in centimetres
    pub width: Decimal,

    /// Number of identical pieces
    #[serde(default = "single_piece")]
    pub quantity: u32,

    /// Payment term
    #[serde(default)]
    pub payment_term: PaymentTerm,

    /// Markup override
    #[serde(default)]
    pub markup: Option<Decimal>,

    /// Order form rows
    #[serde(default)]
    pub selections: Vec<SelectionRequest>,

    /// Discount
    #[serde(default)]
    pub discount: PricingAdjustment,

    /// Surcharge
    #[serde(default)]
    pub surcharge: PricingAdjustment,
}

impl OrderRequest {
    /// Resolve the form's material ids against the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`BomError`] if a material is unknown or a category is repeated.
    pub fn resolve(
        &self,
        catalog: &impl MaterialCatalog,
    ) -> Result<OrderSpecification, BomError> {
        let selections = resolve_selections(&self.selections, catalog, self.payment_term)?;

        Ok(OrderSpecification {
            product_type: self.product_type,
            height: self.height,
            width: self.width,
            quantity: self.quantity,
            payment_term: self.payment_term,
            markup: self.markup,
            selections,
            discount: self.discount,
            surcharge: self.surcharge,
        })
    }
}

fn single_piece() -> u32 {
    1
}
