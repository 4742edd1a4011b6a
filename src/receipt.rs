//! Receipt
//!
//! Terminal rendering of a [`QuotationSnapshot`]. Amounts are rounded to the
//! currency's minor units here and nowhere else.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{pricing::ResolvedAdjustment, quotation::QuotationSnapshot};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Amount does not fit in minor units or percentage points.
    #[error("amount {0} is out of range for display")]
    Conversion(Decimal),

    /// IO error
    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Printable quotation.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    snapshot: &'a QuotationSnapshot,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for `snapshot`, quoted in `currency`.
    pub fn new(snapshot: &'a QuotationSnapshot, currency: &'static Currency) -> Self {
        Self { snapshot, currency }
    }

    /// Final price, rounded to minor units.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Conversion`] if the price overflows.
    pub fn final_price(&self) -> Result<Money<'static, Currency>, ReceiptError> {
        money(self.snapshot.final_price(), self.currency)
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount overflows or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        write_receipt_heading(&mut out, self.snapshot)?;

        let mut builder = Builder::default();

        push_receipt_header(&mut builder);

        let mut color_ops: SmallVec<[(usize, usize, Color); 16]> = SmallVec::new();

        append_line_rows(self, &mut builder, &mut color_ops)?;

        write_receipt_table(&mut out, builder, color_ops)?;

        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_receipt_heading(
    out: &mut impl io::Write,
    snapshot: &QuotationSnapshot,
) -> Result<(), ReceiptError> {
    let geometry = snapshot.geometry();

    writeln!(
        out,
        "\n \x1b[1m{}\x1b[0m  {} m²  {} cm perimeter  x{}  ({})",
        snapshot.product_type(),
        geometry.area_square_metres().normalize(),
        geometry.perimeter().normalize(),
        snapshot.quantity(),
        snapshot.payment_term(),
    )?;

    Ok(())
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record([
        "",
        "Category",
        "Material",
        "Quantity",
        "Unit Price",
        "Subtotal",
    ]);
}

fn append_line_rows(
    receipt: &Receipt<'_>,
    builder: &mut Builder,
    color_ops: &mut SmallVec<[(usize, usize, Color); 16]>,
) -> Result<(), ReceiptError> {
    let snapshot = receipt.snapshot;
    let currency = receipt.currency;

    // header is row 0
    let mut row = 1;

    for (idx, line) in snapshot.line_items().iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.category().to_string(),
            format!("{}\n{}", line.material_id(), line.description()),
            format!("{} {}", line.quantity().normalize(), line.unit()),
            format!("{}", money(line.unit_price(), currency)?),
            format!("{}", money(line.subtotal(), currency)?),
        ]);

        color_ops.push((row, 4, color_dark_grey()));

        row += 1;
    }

    let geometry = snapshot.geometry();

    if !snapshot.offcut_cost().is_zero() {
        builder.push_record([
            String::new(),
            "Offcut".to_string(),
            format!(
                "{} x {} cm bar",
                geometry.bars_required(),
                geometry.bar_length().normalize()
            ),
            format!(
                "{} cm",
                (geometry.offcut_length() * Decimal::from(snapshot.quantity())).normalize()
            ),
            String::new(),
            format!("{}", money(snapshot.offcut_cost(), currency)?),
        ]);

        color_ops.push((row, 1, color_dark_grey()));
        color_ops.push((row, 2, color_dark_grey()));
    }

    Ok(())
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 16]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}")?;

    Ok(())
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let snapshot = receipt.snapshot;
    let currency = receipt.currency;

    let rows = [
        (
            " Cost:".to_string(),
            format!("{}  ", money(snapshot.total_cost(), currency)?),
        ),
        (
            " Markup:".to_string(),
            format!("x{}  ", snapshot.markup().value().normalize()),
        ),
        (
            " Sale price:".to_string(),
            format!("{}  ", money(snapshot.sale_price(), currency)?),
        ),
        (
            " Discount:".to_string(),
            adjustment_display(snapshot.discount(), '-', currency)?,
        ),
        (
            " Surcharge:".to_string(),
            adjustment_display(snapshot.surcharge(), '+', currency)?,
        ),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", money(snapshot.final_price(), currency)?),
        ),
        (
            " Margin:".to_string(),
            format!("{:.2}%  ", percent_points(snapshot.margin())?),
        ),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    // labels and values right-aligned in their own columns
    for (label, value) in &rows {
        let label_pad = label_width.saturating_sub(visible_width(label));
        let value_pad = value_width.saturating_sub(visible_width(value));

        writeln!(out, "{:label_pad$}{label}  {:value_pad$}{value}", "", "")?;
    }

    writeln!(out)?;

    Ok(())
}

fn adjustment_display(
    adjustment: &ResolvedAdjustment,
    sign: char,
    currency: &'static Currency,
) -> Result<String, ReceiptError> {
    Ok(format!(
        "({:.2}%) {sign}{}  ",
        percent_points(adjustment.fraction())?,
        money(adjustment.absolute(), currency)?
    ))
}

/// Round `amount` half away from zero to the currency's minor units.
fn money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ReceiptError> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    rounded.rescale(currency.exponent);

    let minor =
        i64::try_from(rounded.mantissa()).map_err(|_err| ReceiptError::Conversion(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Percentage points of a fractional percentage, to two places.
fn percent_points(fraction: Percentage) -> Result<Decimal, ReceiptError> {
    let ratio = fraction * Decimal::ONE;

    ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|points| points.round_dp(2))
        .ok_or(ReceiptError::Conversion(ratio))
}

const DARK_GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Dims the table's box-drawing borders.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut dimmed = false;

    for ch in table.chars() {
        let border = ('\u{2500}'..='\u{257F}').contains(&ch);

        if border != dimmed {
            out.push_str(if border { DARK_GREY } else { RESET });
            dimmed = border;
        }

        out.push(ch);
    }

    if dimmed {
        out.push_str(RESET);
    }

    out
}

/// Characters a terminal shows, skipping ANSI escape sequences.
fn visible_width(s: &str) -> usize {
    let mut escaped = false;

    s.chars()
        .filter(|&ch| {
            if escaped {
                escaped = !ch.is_ascii_alphabetic();
                false
            } else if ch == '\x1b' {
                escaped = true;
                false
            } else {
                true
            }
        })
        .count()
}

fn color_dark_grey() -> Color {
    Color::new(DARK_GREY, RESET)
}
