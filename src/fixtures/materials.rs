//! Material Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    config::currency_for_code,
    fixtures::FixtureError,
    materials::{CatalogMaterial, PaymentTerm, UnitOfMeasure},
};

/// Wrapper for materials in YAML
#[derive(Debug, Deserialize)]
pub struct MaterialsFixture {
    /// Map of catalog id -> material fixture
    pub materials: FxHashMap<String, MaterialFixture>,
}

/// Material Fixture
#[derive(Debug, Deserialize)]
pub struct MaterialFixture {
    /// Description shown on quotes
    pub description: String,

    /// Unit of measure
    pub unit: UnitOfMeasure,

    /// Cash unit price (e.g., "2.50 BRL")
    pub price: String,

    /// Unit prices for other payment terms
    #[serde(default)]
    pub term_prices: FxHashMap<PaymentTerm, String>,

    /// Bar length for mouldings
    #[serde(default)]
    pub bar_length: Option<Decimal>,
}

impl MaterialFixture {
    /// Build the catalog entry for `id`, returning it with the currency its prices are in.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or the prices mix currencies.
    pub fn into_material(
        self,
        id: String,
    ) -> Result<(CatalogMaterial, &'static Currency), FixtureError> {
        let (cash_cost, currency) = parse_price(&self.price)?;

        let mut material = CatalogMaterial::new(id, self.description, self.unit, cash_cost);

        for (term, price) in &self.term_prices {
            let (cost, term_currency) = parse_price(price)?;

            if term_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    term_currency.iso_alpha_code.to_string(),
                ));
            }

            material = material.with_unit_cost(*term, cost);
        }

        if let Some(bar_length) = self.bar_length {
            material = material.with_bar_length(bar_length);
        }

        Ok((material, currency))
    }
}

/// Parse price string (e.g., "2.50 BRL") into an amount and currency
///
/// The amount keeps its full precision; mouldings are often priced in
/// fractions of a cent per centimetre.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount < Decimal::ZERO {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency =
        currency_for_code(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok((amount, currency))
}
