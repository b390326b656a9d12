//! Price row parsing.
//!
//! Upstream tables mix real prices with separator rows, placeholders and
//! suspended-trading rows (`-`, `0`, empty cells). Those are filtered here,
//! one row at a time: [`parse_row`] returns `None` instead of failing.

pub mod latest;

use chrono::NaiveDate;

use crate::html::Row;
use crate::models::params::{same_month, DAY_FORMAT};
use crate::models::{CurrencyTable, HistoricalSeries, PriceQuote};

/// Which cells of a row hold the label and the two prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    pub label: usize,
    pub sell: usize,
    pub buy: usize,
}

/// Archive tables: `[code, name, sell, buy]`.
pub const ARCHIVE_LAYOUT: RowLayout = RowLayout {
    label: 0,
    sell: 2,
    buy: 3,
};

/// Historical tables: `[date, sell, buy]`.
pub const HISTORICAL_LAYOUT: RowLayout = RowLayout {
    label: 0,
    sell: 1,
    buy: 2,
};

/// Convert one price cell. Surrounding whitespace and thousands separators
/// are ignored; anything else that is not an integer yields `None`.
pub fn parse_price(cell: &str) -> Option<i64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Build a quote from two price cells, applying the positivity rule.
pub fn parse_quote(sell: &str, buy: &str) -> Option<PriceQuote> {
    PriceQuote::new(parse_price(sell)?, parse_price(buy)?)
}

/// Parse one row into `(label, quote)`.
///
/// Returns `None` when the row is too short, a price is not numeric, or a
/// price is not strictly positive.
pub fn parse_row<'a>(row: &'a [String], layout: &RowLayout) -> Option<(&'a str, PriceQuote)> {
    let label = row.get(layout.label)?.trim();
    let quote = parse_quote(row.get(layout.sell)?, row.get(layout.buy)?)?;
    Some((label, quote))
}

/// Archive rows to a table keyed by lower-cased currency code.
pub fn parse_currency_table(rows: &[Row], layout: &RowLayout) -> CurrencyTable {
    rows.iter()
        .filter_map(|row| match parse_row(row, layout) {
            Some((code, quote)) if !code.is_empty() => Some((code.to_lowercase(), quote)),
            _ => {
                log::debug!("Skipping archive row {:?}", row);
                None
            }
        })
        .collect()
}

/// Historical rows to a series, keeping only days inside `month`.
pub fn parse_historical_series(
    rows: &[Row],
    layout: &RowLayout,
    month: NaiveDate,
) -> HistoricalSeries {
    rows.iter()
        .filter_map(|row| {
            let (label, quote) = parse_row(row, layout)?;
            let day = NaiveDate::parse_from_str(label, DAY_FORMAT).ok()?;
            same_month(day, month).then_some((day, quote))
        })
        .collect()
}
