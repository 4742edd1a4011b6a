//! Command line
//!
//! Argument parsing, logging setup and the quote command behind the
//! `framequote` binary.

use std::{io, path::PathBuf};

use clap::{Args, Parser};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

use crate::{
    config::{ConfigError, QuotationConfig},
    fixtures::{Fixture, FixtureError},
    pricing::AdjustmentBase,
    quotation::{QuotationEngine, QuotationError},
    receipt::{Receipt, ReceiptError},
};

/// Errors raised by the quote command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Fixture could not be loaded
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Overrides produced an invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Order could not be quoted
    #[error(transparent)]
    Quotation(#[from] QuotationError),

    /// Receipt could not be written
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Snapshot could not be serialized
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    /// Logging was already initialised
    #[error(transparent)]
    Logging(#[from] TryInitError),
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Quote output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Receipt table
    #[default]
    Table,

    /// Quotation snapshot as JSON
    Json,
}

/// Arguments for the quote command
#[derive(Debug, Parser)]
#[command(name = "framequote", about = "Framing order quotations", long_about = None)]
pub struct QuoteArgs {
    /// Directory holding `materials/`, `orders/` and `config/`
    #[arg(long, env = "FRAMEQUOTE_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Material catalog to price from
    #[arg(short, long, env = "FRAMEQUOTE_CATALOG", default_value = "atelier")]
    pub catalog: String,

    /// Order form to quote
    #[arg(short, long, default_value = "picture")]
    pub order: String,

    /// Configuration to use; defaults apply when omitted
    #[arg(long, env = "FRAMEQUOTE_CONFIG")]
    pub config: Option<String>,

    /// Override the default markup
    #[arg(long, env = "FRAMEQUOTE_MARKUP")]
    pub markup: Option<Decimal>,

    /// Override the default bar length in centimetres
    #[arg(long, env = "FRAMEQUOTE_BAR_LENGTH")]
    pub bar_length: Option<Decimal>,

    /// Override what discounts and surcharges are measured against
    #[arg(long, env = "FRAMEQUOTE_ADJUSTMENT_BASE", value_enum)]
    pub adjustment_base: Option<AdjustmentBase>,

    /// Offcuts at least this long are not charged
    #[arg(long, env = "FRAMEQUOTE_OFFCUT_THRESHOLD")]
    pub offcut_threshold: Option<Decimal>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl QuoteArgs {
    /// Apply command line overrides on top of `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an override is invalid.
    pub fn apply_overrides(
        &self,
        config: QuotationConfig,
    ) -> Result<QuotationConfig, ConfigError> {
        QuotationConfig {
            default_markup: self.markup.unwrap_or(config.default_markup),
            default_bar_length: self.bar_length.unwrap_or(config.default_bar_length),
            adjustment_base: self.adjustment_base.unwrap_or(config.adjustment_base),
            offcut_reuse_threshold: self.offcut_threshold.or(config.offcut_reuse_threshold),
            ..config
        }
        .validate()
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` directives take precedence over `--log-level`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_logging(args: &LoggingArgs) -> Result<(), CliError> {
    match args.log_format {
        LogFormat::Compact => init_with_layer(
            args,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => init_with_layer(
            args,
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_target(true),
        ),
    }
}

fn init_with_layer<L>(args: &LoggingArgs, fmt_layer: L) -> Result<(), CliError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(args))
        .try_init()?;

    Ok(())
}

fn build_env_filter(args: &LoggingArgs) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level))
}

/// Quote the selected order and write it to `out`.
///
/// # Errors
///
/// Returns a [`CliError`] if a fixture is invalid, the order cannot be quoted
/// or the output cannot be written.
pub fn run(args: &QuoteArgs, mut out: impl io::Write) -> Result<(), CliError> {
    let mut fixture = Fixture::with_base_path(&args.fixtures);

    fixture.load_materials(&args.catalog)?;

    let config = match args.config.as_deref() {
        Some(name) => fixture.config(name)?,
        None => fixture.default_config()?,
    };

    let engine = QuotationEngine::new(args.apply_overrides(config)?);
    let request = fixture.order(&args.order)?;
    let snapshot = engine.quote(&request, fixture.catalog())?;

    info!(
        catalog = %args.catalog,
        order = %args.order,
        final_price = %snapshot.final_price(),
        "quoted order"
    );

    match args.format {
        OutputFormat::Table => {
            Receipt::new(&snapshot, engine.config().currency).write_to(&mut out)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &snapshot)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
