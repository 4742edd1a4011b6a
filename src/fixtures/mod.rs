//! Fixtures
//!
//! YAML material catalogs, order forms and configurations, laid out as
//! `materials/<set>.yml`, `orders/<name>.yml` and `config/<name>.yml` under a
//! base directory.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    config::{ConfigError, QuotationConfig},
    fixtures::materials::MaterialsFixture,
    materials::{Catalog, CatalogMaterial},
    orders::OrderRequest,
};

pub mod materials;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Material not found
    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    /// Currency mismatch between materials
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No materials loaded yet
    #[error("No materials loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Materials loaded so far
    catalog: Catalog,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            currency: None,
        }
    }

    /// Load materials from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_materials(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("materials").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: MaterialsFixture = serde_norway::from_str(&contents)?;

        for (id, material_fixture) in fixture.materials {
            let (material, currency) = material_fixture.into_material(id)?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.catalog.insert(material);
        }

        Ok(self)
    }

    /// Load a fixture set by the name of its material catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the materials cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_materials(name)?;

        Ok(fixture)
    }

    /// Read an order form
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn order(&self, name: &str) -> Result<OrderRequest, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Read a configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid or quotes in a different currency
    /// than the loaded materials.
    pub fn config(&self, name: &str) -> Result<QuotationConfig, FixtureError> {
        let file_path = self.base_path.join("config").join(format!("{name}.yml"));
        let config = QuotationConfig::load(file_path)?;

        if let Some(currency) = self.currency
            && currency != config.currency
        {
            return Err(FixtureError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                config.currency.iso_alpha_code.to_string(),
            ));
        }

        Ok(config)
    }

    /// Default configuration, quoting in the currency of the loaded materials
    ///
    /// # Errors
    ///
    /// Returns an error if no materials have been loaded yet.
    pub fn default_config(&self) -> Result<QuotationConfig, FixtureError> {
        Ok(QuotationConfig {
            currency: self.currency()?,
            ..QuotationConfig::default()
        })
    }

    /// Get a material by its catalog id
    ///
    /// # Errors
    ///
    /// Returns an error if the material is not found.
    pub fn material(&self, id: &str) -> Result<&CatalogMaterial, FixtureError> {
        self.catalog
            .key(id)
            .and_then(|key| self.catalog.get(key))
            .ok_or_else(|| FixtureError::MaterialNotFound(id.to_string()))
    }

    /// The material catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no materials have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rust_decimal::Decimal;
    use rusty_money::iso::{BRL, USD};
    use testresult::TestResult;

    use super::*;
    use crate::{materials::PaymentTerm, orders::ProductType, selections::Category};

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_atelier_set() -> TestResult {
        let fixture = Fixture::from_set("atelier")?;

        assert_eq!(fixture.currency()?, BRL);
        assert!(!fixture.catalog().is_empty());

        let moulding = fixture.material("MOL-1020")?;

        assert_eq!(moulding.unit_cost(PaymentTerm::Cash), Some(Decimal::new(250, 2)));

        Ok(())
    }

    #[test]
    fn fixture_reads_orders() -> TestResult {
        let fixture = Fixture::from_set("atelier")?;

        let order = fixture.order("picture")?;

        assert_eq!(order.product_type, ProductType::Picture);
        assert!(
            order
                .selections
                .iter()
                .any(|selection| selection.category == Category::Frame)
        );

        Ok(())
    }

    #[test]
    fn missing_material_is_reported() -> TestResult {
        let fixture = Fixture::from_set("atelier")?;

        assert!(matches!(
            fixture.material("NOPE"),
            Err(FixtureError::MaterialNotFound(id)) if id == "NOPE"
        ));

        Ok(())
    }

    #[test]
    fn currency_is_unknown_before_loading() {
        assert!(matches!(Fixture::new().currency(), Err(FixtureError::NoCurrency)));
        assert!(matches!(
            Fixture::new().default_config(),
            Err(FixtureError::NoCurrency)
        ));
    }

    #[test]
    fn materials_in_different_currencies_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "materials",
            "brl",
            "materials:\n  A:\n    description: A\n    unit: unit\n    price: \"1 BRL\"\n",
        )?;
        write_fixture(
            dir.path(),
            "materials",
            "usd",
            "materials:\n  B:\n    description: B\n    unit: unit\n    price: \"1 USD\"\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_materials("brl")?;

        assert!(matches!(
            fixture.load_materials("usd"),
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "BRL" && found == "USD"
        ));

        Ok(())
    }

    #[test]
    fn config_must_match_material_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "materials",
            "brl",
            "materials:\n  A:\n    description: A\n    unit: unit\n    price: \"1 BRL\"\n",
        )?;
        write_fixture(dir.path(), "config", "usd", "currency: USD\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_materials("brl")?;

        assert!(matches!(
            fixture.config("usd"),
            Err(FixtureError::CurrencyMismatch(_, found)) if found == USD.iso_alpha_code
        ));

        Ok(())
    }

    #[test]
    fn default_config_uses_material_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "materials",
            "usd",
            "materials:\n  A:\n    description: A\n    unit: unit\n    price: \"1 USD\"\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_materials("usd")?;

        assert_eq!(fixture.default_config()?.currency, USD);

        Ok(())
    }
}
