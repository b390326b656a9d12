//! Live price board parsing.
//!
//! The board is served by an undocumented JSON endpoint guarded by a token
//! embedded in the home page script. The payload is a flat object keyed by
//! code plus a numeric suffix.

use regex::Regex;
use serde_json::{Map, Value};

use super::parse_quote;
use crate::errors::MarketDataError;
use crate::models::CurrencyTable;

/// Raw payload returned by the board endpoint.
pub type LatestPayload = Map<String, Value>;

/// Currencies tracked on the board. Sell is `{code}1`, buy is `{code}2`.
pub const CURRENCY_CODES: &[&str] = &[
    "usd", "eur", "gbp", "chf", "cad", "aud", "sek", "nok", "rub", "thb", "sgd", "hkd", "azn",
    "amd", "dkk", "aed", "jpy", "try", "cny", "sar", "inr", "myr", "afn", "kwd", "iqd", "bhd",
    "omr", "qar",
];

/// Coins tracked on the board. Sell is `{code}`, buy is `{code}2`.
pub const COIN_CODES: &[&str] = &["emami1", "azadi1g", "azadi1", "azadi1_2", "azadi1_4"];

/// Which part of the live board to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Board {
    Currencies,
    Coins,
}

impl Board {
    pub fn as_str(&self) -> &'static str {
        match self {
            Board::Currencies => "currencies",
            Board::Coins => "coins",
        }
    }

    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            Board::Currencies => CURRENCY_CODES,
            Board::Coins => COIN_CODES,
        }
    }

    /// Payload keys holding the sell and buy prices of `code`.
    fn price_keys(&self, code: &str) -> (String, String) {
        match self {
            Board::Currencies => (format!("{code}1"), format!("{code}2")),
            Board::Coins => (code.to_string(), format!("{code}2")),
        }
    }
}

/// Extract the session token from the home page script.
pub fn extract_token(page: &str) -> Result<String, MarketDataError> {
    let pattern = Regex::new(r#"param\s*[:=]\s*"([^"]+)""#)
        .map_err(|e| MarketDataError::Parse(format!("invalid token pattern: {e}")))?;
    pattern
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| MarketDataError::Parse("token not found in the main page".to_string()))
}

/// Reason for a refused board request, if the payload is a refusal.
pub fn rejection_reason(payload: &LatestPayload) -> Option<String> {
    payload
        .get("reset")
        .map(|value| format!("upstream asked for a token reset ({value})"))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read one board out of the payload. Codes with missing, non-numeric or
/// non-positive prices are left out.
pub fn parse_board(payload: &LatestPayload, board: Board) -> CurrencyTable {
    board
        .codes()
        .iter()
        .filter_map(|code| {
            let (sell_key, buy_key) = board.price_keys(code);
            let sell = payload.get(&sell_key).and_then(value_text)?;
            let buy = payload.get(&buy_key).and_then(value_text)?;
            match parse_quote(&sell, &buy) {
                Some(quote) => Some((code.to_lowercase(), quote)),
                None => {
                    log::debug!("Skipping {} {}: sell={} buy={}", board.as_str(), code, sell, buy);
                    None
                }
            }
        })
        .collect()
}
