//! Bonbast Market Data Crate
//!
//! Scrapes exchange rates published by bonbast.com and turns them into
//! typed, cacheable results.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   RatesService   |  (operations, cache keys, date ranges)
//! +------------------+
//!          |                         +------------------+
//!          +-----------------------> |  ResponseCache   |  (moka, per-entry TTL)
//!          |                         +------------------+
//!          v
//! +------------------+
//! |   RatesFetcher   |  (BonbastClient: form posts, token + JSON board)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  html extractor  | --> |   row parser     |  (tolerant: bad rows are skipped)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceQuote`] - Sell/buy pair, both strictly positive
//! - [`CurrencyTable`] - Code to quote
//! - [`HistoricalSeries`] - Day to quote for one currency
//! - [`ArchiveSnapshot`] - One day's table plus its date
//! - [`DateRangeResult`] - Day to table

pub mod cache;
pub mod errors;
pub mod html;
pub mod models;
pub mod parser;
pub mod provider;
pub mod service;

pub use cache::{ResponseCache, SharedResponseCache};
pub use errors::MarketDataError;
pub use models::{ArchiveSnapshot, CurrencyTable, DateRangeResult, HistoricalSeries, PriceQuote};
pub use parser::latest::Board;
pub use provider::{BonbastClient, RatesFetcher};
pub use service::{CacheTtls, RatesService};
