//! Framequote prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bom::{BomError, LineItem, line_items, resolve_selections},
    config::{ConfigError, DEFAULT_BAR_LENGTH, DEFAULT_MARKUP, QuotationConfig},
    costs::{CostError, materials_cost, total_cost},
    geometry::{GeometryError, GeometryResult, measure},
    materials::{
        Catalog, CatalogMaterial, MaterialCatalog, MaterialKey, MaterialReference, PaymentTerm,
        UnitOfMeasure,
    },
    orders::{OrderRequest, OrderSpecification, ProductType},
    pricing::{
        AdjustmentBase, AdjustmentDriver, Markup, PriceReconciliation, PricingAdjustment,
        PricingError, ResolvedAdjustment, reconcile,
    },
    quotation::{QuotationEngine, QuotationError, QuotationSnapshot, calculate},
    receipt::{Receipt, ReceiptError},
    selections::{Category, MaterialSelections, Selection, SelectionRequest},
};
