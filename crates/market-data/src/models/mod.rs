//! Exchange rate models
//!
//! - `quote` - Price data structures (PriceQuote, CurrencyTable, ArchiveSnapshot, ...)
//! - `params` - Strict parsing of request parameters (days, months, currency codes)

pub mod params;
mod quote;

pub use quote::{ArchiveSnapshot, CurrencyTable, DateRangeResult, HistoricalSeries, PriceQuote};
