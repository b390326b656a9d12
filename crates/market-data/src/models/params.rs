//! Strict parsing of caller-supplied request parameters.
//!
//! Formats are checked character by character before chrono validates the
//! calendar, so `2024-3-5` and `15-03-2024` are both rejected.

use chrono::{Datelike, Days, NaiveDate};

use crate::errors::MarketDataError;

/// Day format used in requests, cache keys and JSON keys.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Month format accepted by the historical operation.
pub const MONTH_FORMAT: &str = "%Y-%m";

const DAY_ERROR: &str = "Invalid Date format. Expected YYYY-MM-DD";
const MONTH_ERROR: &str = "Invalid Date format. Expected YYYY-MM";

/// Matches `raw` against a shape where `9` is any ASCII digit and every
/// other byte must match literally.
fn has_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'9' => c.is_ascii_digit(),
            _ => c == s,
        })
}

/// Parse a `YYYY-MM-DD` day.
pub fn parse_day(raw: &str) -> Result<NaiveDate, MarketDataError> {
    if !has_shape(raw, "9999-99-99") {
        return Err(MarketDataError::InvalidInput(DAY_ERROR.to_string()));
    }
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|_| MarketDataError::InvalidInput(DAY_ERROR.to_string()))
}

/// Parse a `YYYY-MM` month, returning its first day.
pub fn parse_month(raw: &str) -> Result<NaiveDate, MarketDataError> {
    if !has_shape(raw, "9999-99") {
        return Err(MarketDataError::InvalidInput(MONTH_ERROR.to_string()));
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), DAY_FORMAT)
        .map_err(|_| MarketDataError::InvalidInput(MONTH_ERROR.to_string()))
}

/// Resolve an optional day parameter, falling back to `default`.
pub fn resolve_day(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, MarketDataError> {
    raw.map_or(Ok(default), parse_day)
}

/// Resolve an optional month parameter, falling back to the month of `today`.
pub fn resolve_month(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, MarketDataError> {
    match raw {
        Some(raw) => parse_month(raw),
        None => Ok(first_of_month(today)),
    }
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Whether `day` falls in the month starting at `month`.
pub fn same_month(day: NaiveDate, month: NaiveDate) -> bool {
    day.year() == month.year() && day.month() == month.month()
}

/// The day before `day`.
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(1)).unwrap_or(day)
}

/// Lower-case and validate a currency code taken from the URL.
pub fn normalize_currency(raw: &str) -> Result<String, MarketDataError> {
    let code = raw.trim().to_ascii_lowercase();
    let valid = (2..=10).contains(&code.len())
        && code
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'_');
    if valid {
        Ok(code)
    } else {
        Err(MarketDataError::InvalidInput(format!(
            "Invalid currency code: {raw}"
        )))
    }
}
