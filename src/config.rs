//! Quotation configuration

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::AdjustmentBase;

/// Standard moulding bar length in centimetres.
pub const DEFAULT_BAR_LENGTH: Decimal = Decimal::from_parts(270, 0, 0, false, 0);

/// Markup applied when an order does not override it.
pub const DEFAULT_MARKUP: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Default markup is not positive
    #[error("Default markup must be greater than zero, got {0}")]
    InvalidMarkup(Decimal),

    /// Default bar length is not positive
    #[error("Default bar length must be greater than zero, got {0}")]
    InvalidBarLength(Decimal),

    /// Offcut reuse threshold is negative
    #[error("Offcut reuse threshold must not be negative, got {0}")]
    InvalidThreshold(Decimal),
}

/// Settings the engine reads on every calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotationConfig {
    /// Currency all prices are quoted in
    pub currency: &'static Currency,

    /// Markup used when an order does not set one
    pub default_markup: Decimal,

    /// Bar length for mouldings that do not declare their own
    pub default_bar_length: Decimal,

    /// What discounts and surcharges are measured against
    pub adjustment_base: AdjustmentBase,

    /// Offcuts at least this long go back to stock and are not charged
    pub offcut_reuse_threshold: Option<Decimal>,
}

impl Default for QuotationConfig {
    fn default() -> Self {
        Self {
            currency: iso::BRL,
            default_markup: DEFAULT_MARKUP,
            default_bar_length: DEFAULT_BAR_LENGTH,
            adjustment_base: AdjustmentBase::default(),
            offcut_reuse_threshold: None,
        }
    }
}

impl QuotationConfig {
    /// Parse a YAML configuration; omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is malformed or a value is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(contents)?;

        file.try_into()
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.default_markup <= Decimal::ZERO {
            return Err(ConfigError::InvalidMarkup(self.default_markup));
        }

        if self.default_bar_length <= Decimal::ZERO {
            return Err(ConfigError::InvalidBarLength(self.default_bar_length));
        }

        if let Some(threshold) = self.offcut_reuse_threshold
            && threshold < Decimal::ZERO
        {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        Ok(self)
    }
}

/// Configuration as written in YAML.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    currency: Option<String>,

    #[serde(default)]
    default_markup: Option<Decimal>,

    #[serde(default)]
    default_bar_length: Option<Decimal>,

    #[serde(default)]
    adjustment_base: Option<AdjustmentBase>,

    #[serde(default)]
    offcut_reuse_threshold: Option<Decimal>,
}

impl TryFrom<ConfigFile> for QuotationConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let defaults = QuotationConfig::default();

        let currency = match file.currency {
            Some(code) => {
                currency_for_code(&code).ok_or(ConfigError::UnknownCurrency(code))?
            }
            None => defaults.currency,
        };

        QuotationConfig {
            currency,
            default_markup: file.default_markup.unwrap_or(defaults.default_markup),
            default_bar_length: file
                .default_bar_length
                .unwrap_or(defaults.default_bar_length),
            adjustment_base: file.adjustment_base.unwrap_or(defaults.adjustment_base),
            offcut_reuse_threshold: file.offcut_reuse_threshold,
        }
        .validate()
    }
}

/// Look up a supported ISO currency by code.
pub fn currency_for_code(code: &str) -> Option<&'static Currency> {
    match code {
        "BRL" => Some(iso::BRL),
        "USD" => Some(iso::USD),
        "EUR" => Some(iso::EUR),
        "GBP" => Some(iso::GBP),
        _ => None,
    }
}
