//! Quotation
//!
//! [`calculate`] is the engine's entry point. It re-derives everything from the
//! order on every call; a snapshot is never patched, only replaced.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    bom::{self, BomError, LineItem},
    config::QuotationConfig,
    costs::{CostError, total_cost},
    geometry::{self, GeometryError, GeometryResult},
    materials::{MaterialCatalog, PaymentTerm, UnitOfMeasure},
    orders::{OrderRequest, OrderSpecification, ProductType},
    pricing::{self, Markup, PricingError, ResolvedAdjustment},
};

/// Errors raised while quoting an order.
#[derive(Debug, Error, PartialEq)]
pub enum QuotationError {
    /// Quantity is zero.
    #[error("invalid quantity {0}; must be at least 1")]
    InvalidQuantity(u32),

    /// Dimensions or bar length are invalid.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Materials could not be resolved.
    #[error(transparent)]
    Bom(#[from] BomError),

    /// Material cost is out of range.
    #[error(transparent)]
    Cost(#[from] CostError),

    /// Markup or adjustments are invalid.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Fully derived, immutable pricing of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotationSnapshot {
    product_type: ProductType,
    quantity: u32,
    payment_term: PaymentTerm,
    currency: &'static str,
    geometry: GeometryResult,
    line_items: Vec<LineItem>,
    offcut_cost: Decimal,
    total_cost: Decimal,
    markup: Markup,
    sale_price: Decimal,
    adjustment_base: Decimal,
    discount: ResolvedAdjustment,
    surcharge: ResolvedAdjustment,
    final_price: Decimal,
    margin_percentage: Decimal,
}

impl QuotationSnapshot {
    /// Product type
    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Number of pieces
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Payment term the prices were captured for
    pub fn payment_term(&self) -> PaymentTerm {
        self.payment_term
    }

    /// ISO code of the quote currency
    pub fn currency(&self) -> &'static str {
        self.currency
    }

    /// Measurements of one piece
    pub fn geometry(&self) -> &GeometryResult {
        &self.geometry
    }

    /// Bill of materials
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Offcut cost charged across all pieces
    pub fn offcut_cost(&self) -> Decimal {
        self.offcut_cost
    }

    /// Line item subtotals plus the charged offcut
    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    /// Markup applied to the total cost
    pub fn markup(&self) -> Markup {
        self.markup
    }

    /// `total_cost * markup`
    pub fn sale_price(&self) -> Decimal {
        self.sale_price
    }

    /// Amount discount and surcharge are measured against
    pub fn adjustment_base(&self) -> Decimal {
        self.adjustment_base
    }

    /// Discount
    pub fn discount(&self) -> &ResolvedAdjustment {
        &self.discount
    }

    /// Surcharge
    pub fn surcharge(&self) -> &ResolvedAdjustment {
        &self.surcharge
    }

    /// Price the customer pays
    pub fn final_price(&self) -> Decimal {
        self.final_price
    }

    /// Margin in percentage points of the sale price
    pub fn margin_percentage(&self) -> Decimal {
        self.margin_percentage
    }

    /// Margin as a fraction
    pub fn margin(&self) -> Percentage {
        Percentage::from(self.margin_percentage / Decimal::ONE_HUNDRED)
    }
}

/// Quotation engine bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct QuotationEngine {
    config: QuotationConfig,
}

impl QuotationEngine {
    /// Create an engine.
    pub fn new(config: QuotationConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub fn config(&self) -> &QuotationConfig {
        &self.config
    }

    /// Quote a resolved order.
    ///
    /// # Errors
    ///
    /// Returns the first [`QuotationError`] encountered.
    pub fn calculate(&self, order: &OrderSpecification) -> Result<QuotationSnapshot, QuotationError> {
        calculate(order, &self.config)
    }

    /// Resolve an order form against `catalog`, then quote it.
    ///
    /// # Errors
    ///
    /// Returns the first [`QuotationError`] encountered.
    pub fn quote(
        &self,
        request: &OrderRequest,
        catalog: &impl MaterialCatalog,
    ) -> Result<QuotationSnapshot, QuotationError> {
        let order = request.resolve(catalog)?;

        self.calculate(&order)
    }
}

/// Quote a resolved order.
///
/// # Errors
///
/// - [`QuotationError::InvalidQuantity`]: quantity is zero.
/// - [`QuotationError::Geometry`]: dimensions or bar length are not positive.
/// - [`QuotationError::Bom`], [`QuotationError::Cost`]: a line or the total cost
///   is out of range.
/// - [`QuotationError::Pricing`]: markup is not positive or an adjustment is
///   negative, or either pushes a price out of range.
#[instrument(level = "debug", skip_all, fields(height = %order.height, width = %order.width))]
pub fn calculate(
    order: &OrderSpecification,
    config: &QuotationConfig,
) -> Result<QuotationSnapshot, QuotationError> {
    if order.quantity == 0 {
        return Err(QuotationError::InvalidQuantity(order.quantity));
    }

    let frame = order.selections.frame();

    let bar_length = frame
        .and_then(|moulding| moulding.bar_length)
        .unwrap_or(config.default_bar_length);

    let linear_unit_cost = frame
        .filter(|moulding| moulding.unit == UnitOfMeasure::Linear)
        .map_or(Decimal::ZERO, |moulding| moulding.unit_price);

    let geometry =
        geometry::measure(order.height, order.width, bar_length)?.priced(linear_unit_cost)?;

    let line_items = bom::line_items(&order.selections, &geometry, order.quantity)?;

    let offcut_cost = chargeable_offcut(&geometry, config)
        .checked_mul(Decimal::from(order.quantity))
        .ok_or(CostError::OutOfRange)?;
    let total_cost = total_cost(&line_items, offcut_cost)?;

    let markup = Markup::new(order.markup.unwrap_or(config.default_markup))?;

    let priced = pricing::reconcile(
        total_cost,
        &line_items,
        markup,
        config.adjustment_base,
        &order.discount,
        &order.surcharge,
    )?;

    debug!(
        lines = line_items.len(),
        bars = geometry.bars_required(),
        %offcut_cost,
        %total_cost,
        sale_price = %priced.sale_price,
        final_price = %priced.final_price,
        "calculated quotation"
    );

    Ok(QuotationSnapshot {
        product_type: order.product_type,
        quantity: order.quantity,
        payment_term: order.payment_term,
        currency: config.currency.iso_alpha_code,
        geometry,
        line_items,
        offcut_cost,
        total_cost,
        markup,
        sale_price: priced.sale_price,
        adjustment_base: priced.base,
        discount: priced.discount,
        surcharge: priced.surcharge,
        final_price: priced.final_price,
        margin_percentage: priced.margin_percentage,
    })
}

/// Offcut cost of one piece, unless the offcut is long enough to go back to stock.
fn chargeable_offcut(geometry: &GeometryResult, config: &QuotationConfig) -> Decimal {
    match config.offcut_reuse_threshold {
        Some(threshold) if geometry.offcut_length() >= threshold => Decimal::ZERO,
        _ => geometry.offcut_cost(),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        materials::MaterialReference, pricing::PricingAdjustment, selections::Category,
    };

    fn moulding() -> MaterialReference {
        MaterialReference::new(
            "MOL-1020",
            "Moulding 2cm black",
            UnitOfMeasure::Linear,
            Decimal::new(250, 2),
        )
    }

    fn thirty_by_forty() -> OrderSpecification {
        OrderSpecification::new(ProductType::Picture, Decimal::from(30), Decimal::from(40))
    }

    #[test]
    fn frame_cost_covers_whole_bar() -> TestResult {
        let order = thirty_by_forty().with_material(Category::Frame, moulding());

        let snapshot = calculate(&order, &QuotationConfig::default())?;

        // 140cm charged on the line, 130cm of offcut on top: one 270cm bar
        assert_eq!(snapshot.geometry().offcut_cost(), Decimal::from(325));
        assert_eq!(snapshot.offcut_cost(), Decimal::from(325));
        assert_eq!(snapshot.total_cost(), Decimal::from(675));
        assert_eq!(snapshot.sale_price(), Decimal::from(2025));
        assert_eq!(snapshot.currency(), "BRL");

        Ok(())
    }

    #[test]
    fn moulding_bar_length_overrides_default() -> TestResult {
        let order = thirty_by_forty()
            .with_material(Category::Frame, moulding().with_bar_length(Decimal::from(150)));

        let snapshot = calculate(&order, &QuotationConfig::default())?;

        assert_eq!(snapshot.geometry().bar_length(), Decimal::from(150));
        assert_eq!(snapshot.geometry().offcut_length(), Decimal::TEN);
        assert_eq!(snapshot.offcut_cost(), Decimal::from(25));

        Ok(())
    }

    #[test]
    fn long_offcut_returns_to_stock_when_threshold_set() -> TestResult {
        let config = QuotationConfig {
            offcut_reuse_threshold: Some(Decimal::from(100)),
            ..QuotationConfig::default()
        };
        let order = thirty_by_forty().with_material(Category::Frame, moulding());

        let snapshot = calculate(&order, &config)?;

        assert_eq!(snapshot.geometry().offcut_cost(), Decimal::from(325));
        assert_eq!(snapshot.offcut_cost(), Decimal::ZERO);
        assert_eq!(snapshot.total_cost(), Decimal::from(350));

        Ok(())
    }

    #[test]
    fn short_offcut_is_charged_below_threshold() -> TestResult {
        let config = QuotationConfig {
            offcut_reuse_threshold: Some(Decimal::from(100)),
            ..QuotationConfig::default()
        };
        // 2 * (60 + 70) = 260, offcut 10
        let order =
            OrderSpecification::new(ProductType::Picture, Decimal::from(60), Decimal::from(70))
                .with_material(Category::Frame, moulding());

        let snapshot = calculate(&order, &config)?;

        assert_eq!(snapshot.offcut_cost(), Decimal::from(25));

        Ok(())
    }

    #[test]
    fn offcut_scales_with_quantity() -> TestResult {
        let order = thirty_by_forty()
            .with_material(Category::Frame, moulding())
            .with_quantity(2);

        let snapshot = calculate(&order, &QuotationConfig::default())?;

        assert_eq!(snapshot.offcut_cost(), Decimal::from(650));
        assert_eq!(snapshot.total_cost(), Decimal::from(1350));

        Ok(())
    }

    #[test]
    fn no_frame_means_no_offcut_cost() -> TestResult {
        let glass = MaterialReference::new("VID", "Glass", UnitOfMeasure::Area, Decimal::from(100));
        let order = thirty_by_forty().with_material(Category::Glass, glass);

        let snapshot = calculate(&order, &QuotationConfig::default())?;

        assert_eq!(snapshot.offcut_cost(), Decimal::ZERO);
        assert_eq!(snapshot.total_cost(), Decimal::from(12));

        Ok(())
    }

    #[test]
    fn order_markup_overrides_default() -> TestResult {
        let order = thirty_by_forty()
            .with_material(Category::Frame, moulding())
            .with_markup(Decimal::TWO);

        let snapshot = calculate(&order, &QuotationConfig::default())?;

        assert_eq!(snapshot.markup().value(), Decimal::TWO);
        assert_eq!(snapshot.sale_price(), Decimal::from(1350));
        assert_eq!(snapshot.margin_percentage(), Decimal::from(50));
        assert_eq!(snapshot.margin(), Percentage::from(Decimal::new(5, 1)));

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let order = thirty_by_forty().with_quantity(0);

        assert_eq!(
            calculate(&order, &QuotationConfig::default()),
            Err(QuotationError::InvalidQuantity(0))
        );
    }

    #[test]
    fn invalid_markup_is_rejected() {
        let order = thirty_by_forty().with_markup(Decimal::ZERO);

        assert_eq!(
            calculate(&order, &QuotationConfig::default()),
            Err(QuotationError::Pricing(PricingError::InvalidMarkup(
                Decimal::ZERO
            )))
        );
    }

    #[test]
    fn dimension_error_wins_over_later_errors() {
        let order =
            OrderSpecification::new(ProductType::Picture, Decimal::ZERO, Decimal::from(40))
                .with_markup(Decimal::ZERO)
                .with_discount(PricingAdjustment::value(Decimal::NEGATIVE_ONE));

        assert!(matches!(
            calculate(&order, &QuotationConfig::default()),
            Err(QuotationError::Geometry(GeometryError::InvalidDimension { .. }))
        ));
    }

    #[test]
    fn engine_uses_its_config() -> TestResult {
        let engine = QuotationEngine::new(QuotationConfig {
            default_markup: Decimal::from(4),
            ..QuotationConfig::default()
        });

        let snapshot = engine.calculate(&thirty_by_forty().with_material(Category::Frame, moulding()))?;

        assert_eq!(snapshot.sale_price(), Decimal::from(2700));

        Ok(())
    }
}
