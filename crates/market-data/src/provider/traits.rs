//! Upstream fetcher trait definition.
//!
//! The service layer only talks to the upstream through [`RatesFetcher`],
//! which keeps the scraping transport swappable in tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::parser::latest::LatestPayload;

/// Source of raw upstream documents.
///
/// Implementations make exactly one attempt per call: no retries, and any
/// non-success status is an error carrying the requested address.
#[async_trait]
pub trait RatesFetcher: Send + Sync {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the live price board payload.
    async fn fetch_latest(&self) -> Result<LatestPayload, MarketDataError>;

    /// Fetch the historical page of `currency` for the month starting at `month`.
    async fn fetch_historical_page(
        &self,
        currency: &str,
        month: NaiveDate,
    ) -> Result<String, MarketDataError>;

    /// Fetch the archive page of a single day.
    async fn fetch_archive_page(&self, day: NaiveDate) -> Result<String, MarketDataError>;
}
