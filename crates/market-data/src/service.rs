//! Rates Service - Facade for all exchange rate operations
//!
//! This service coordinates the upstream fetcher, the HTML extraction and
//! row parsing steps, and the response cache. Every operation is cached
//! under `operation:params` with the resolved parameters.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::cache::{ResponseCache, SharedResponseCache};
use crate::errors::MarketDataError;
use crate::html::{first_table_rows, merged_table_rows};
use crate::models::params::{first_of_month, normalize_currency, DAY_FORMAT, MONTH_FORMAT};
use crate::models::{ArchiveSnapshot, CurrencyTable, DateRangeResult, HistoricalSeries};
use crate::parser::latest::{parse_board, Board};
use crate::parser::{
    parse_currency_table, parse_historical_series, ARCHIVE_LAYOUT, HISTORICAL_LAYOUT,
};
use crate::provider::RatesFetcher;

/// Trailing tables on the archive page that hold no prices.
const ARCHIVE_TRAILING_TABLES: usize = 1;

/// Default longest accepted range, in days (inclusive).
pub const DEFAULT_MAX_RANGE_DAYS: u32 = 366;

/// How long each kind of response stays cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheTtls {
    /// Live boards
    pub latest: Duration,
    /// Historical series, archive days and archive ranges
    pub archive: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            latest: Duration::from_secs(30 * 60),
            archive: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Every day from `start` to `end`, both inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Rates Service providing cached access to the upstream exchange rates
pub struct RatesService {
    fetcher: Arc<dyn RatesFetcher>,
    cache: SharedResponseCache,
    ttls: CacheTtls,
    max_range_days: u32,
}

impl RatesService {
    /// Create a service with default TTLs and range limit
    pub fn new(fetcher: Arc<dyn RatesFetcher>, cache: SharedResponseCache) -> Self {
        Self {
            fetcher,
            cache,
            ttls: CacheTtls::default(),
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }

    /// Create a service with a private default-sized cache
    pub fn with_fetcher(fetcher: Arc<dyn RatesFetcher>) -> Self {
        Self::new(fetcher, Arc::new(ResponseCache::default()))
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn with_max_range_days(mut self, max_range_days: u32) -> Self {
        self.max_range_days = max_range_days;
        self
    }

    /// Latest prices of one board of the live price page
    pub async fn latest(&self, board: Board) -> Result<CurrencyTable, MarketDataError> {
        let key = format!("latest:{}", board.as_str());
        self.cache
            .cached(&key, self.ttls.latest, || async {
                let payload = self.fetcher.fetch_latest().await?;
                Ok::<_, MarketDataError>(parse_board(&payload, board))
            })
            .await
    }

    /// One currency's quotes for every day of the month starting at `month`
    pub async fn historical(
        &self,
        currency: &str,
        month: NaiveDate,
    ) -> Result<HistoricalSeries, MarketDataError> {
        let currency = normalize_currency(currency)?;
        let month = first_of_month(month);
        let key = format!("historical:{}:{}", currency, month.format(MONTH_FORMAT));
        self.cache
            .cached(&key, self.ttls.archive, || async {
                let page = self
                    .fetcher
                    .fetch_historical_page(&currency, month)
                    .await?;
                let rows = first_table_rows(&page)?;
                Ok::<_, MarketDataError>(parse_historical_series(
                    &rows,
                    &HISTORICAL_LAYOUT,
                    month,
                ))
            })
            .await
    }

    /// All currencies' quotes on a single day
    pub async fn archive(&self, day: NaiveDate) -> Result<ArchiveSnapshot, MarketDataError> {
        let key = format!("archive:{}", day.format(DAY_FORMAT));
        self.cache
            .cached(&key, self.ttls.archive, || async {
                let page = self.fetcher.fetch_archive_page(day).await?;
                let rows = merged_table_rows(&page, ARCHIVE_TRAILING_TABLES)?;
                Ok::<_, MarketDataError>(ArchiveSnapshot::new(
                    day,
                    parse_currency_table(&rows, &ARCHIVE_LAYOUT),
                ))
            })
            .await
    }

    /// Archive tables for every day from `start` to `end` inclusive.
    ///
    /// Days are fetched one after another through [`archive`](Self::archive),
    /// so overlapping ranges share the per-day cache. The first failing day
    /// fails the whole range.
    pub async fn archive_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DateRangeResult, MarketDataError> {
        self.validate_range(start, end)?;

        let key = format!(
            "archive_range:{}:{}",
            start.format(DAY_FORMAT),
            end.format(DAY_FORMAT)
        );
        self.cache
            .cached(&key, self.ttls.archive, || async {
                let mut range = DateRangeResult::new();
                for day in days_inclusive(start, end) {
                    let snapshot = self.archive(day).await?;
                    range.insert(day, snapshot.into_table());
                }
                Ok::<_, MarketDataError>(range)
            })
            .await
    }

    fn validate_range(&self, start: NaiveDate, end: NaiveDate) -> Result<(), MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidInput(format!(
                "start_date {} is after end_date {}",
                start.format(DAY_FORMAT),
                end.format(DAY_FORMAT)
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > i64::from(self.max_range_days) {
            return Err(MarketDataError::InvalidInput(format!(
                "Date range spans {} days, at most {} are allowed",
                days, self.max_range_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceQuote;
    use crate::parser::latest::LatestPayload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ARCHIVE_PAGE: &str = r#"
        <html><body>
          <h3>Archive for 1403/01/01 (printed by the site)</h3>
          <table>
            <tr><th>Code</th><th>Currency</th><th>Sell</th><th>Buy</th></tr>
            <tr><td>USD</td><td>US Dollar</td><td>61200</td><td>61100</td></tr>
            <tr><td>EUR</td><td>Euro</td><td>0</td><td>0</td></tr>
          </table>
          <table>
            <tr><th>Code</th><th>Currency</th><th>Sell</th><th>Buy</th></tr>
            <tr><td>GBP</td><td>British Pound</td><td>77000</td><td>76500</td></tr>
            <tr><td>RUB</td><td>Russian Ruble</td><td>-</td><td>-</td></tr>
          </table>
          <table><tr><td>Legend</td></tr><tr><td>1 2 3 4</td></tr></table>
        </body></html>
    "#;

    const HISTORICAL_PAGE: &str = r#"
        <table>
          <tr><th>Date</th><th>Sell</th><th>Buy</th></tr>
          <tr><td>2024-03-01</td><td>61200</td><td>61100</td></tr>
          <tr><td>2024-03-02</td><td>61300</td><td>61200</td></tr>
          <tr><td>2024-02-29</td><td>61000</td><td>60900</td></tr>
          <tr><td>2024-03-03</td><td>closed</td><td>closed</td></tr>
        </table>
    "#;

    #[derive(Default)]
    struct FakeFetcher {
        latest_calls: AtomicUsize,
        historical_calls: AtomicUsize,
        archive_calls: AtomicUsize,
        failing_days: Mutex<HashSet<NaiveDate>>,
    }

    #[async_trait]
    impl RatesFetcher for FakeFetcher {
        fn id(&self) -> &'static str {
            "FAKE"
        }

        async fn fetch_latest(&self) -> Result<LatestPayload, MarketDataError> {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            match json!({
                "usd1": "61200", "usd2": "61100",
                "eur1": "66000", "eur2": "65800",
                "emami1": "420000", "emami12": "418000"
            }) {
                serde_json::Value::Object(map) => Ok(map),
                _ => unreachable!(),
            }
        }

        async fn fetch_historical_page(
            &self,
            _currency: &str,
            _month: NaiveDate,
        ) -> Result<String, MarketDataError> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            Ok(HISTORICAL_PAGE.to_string())
        }

        async fn fetch_archive_page(&self, day: NaiveDate) -> Result<String, MarketDataError> {
            self.archive_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_days.lock().unwrap().contains(&day) {
                return Err(MarketDataError::Upstream {
                    url: "https://www.bonbast.com/archive".to_string(),
                    status: 500,
                });
            }
            Ok(ARCHIVE_PAGE.to_string())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (Arc<FakeFetcher>, RatesService) {
        let fetcher = Arc::new(FakeFetcher::default());
        let service = RatesService::with_fetcher(fetcher.clone());
        (fetcher, service)
    }

    #[test]
    fn test_days_inclusive() {
        let days: Vec<NaiveDate> = days_inclusive(day(2024, 2, 28), day(2024, 3, 1)).collect();
        assert_eq!(days, vec![day(2024, 2, 28), day(2024, 2, 29), day(2024, 3, 1)]);
        assert_eq!(days_inclusive(day(2024, 3, 1), day(2024, 3, 1)).count(), 1);
        assert_eq!(days_inclusive(day(2024, 3, 2), day(2024, 3, 1)).count(), 0);
    }

    #[tokio::test]
    async fn test_latest_boards() {
        let (_, service) = service();

        let currencies = service.latest(Board::Currencies).await.unwrap();
        assert_eq!(currencies.len(), 2);
        assert_eq!(currencies["usd"], PriceQuote::new(61200, 61100).unwrap());

        let coins = service.latest(Board::Coins).await.unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins["emami1"].buy, 418000);
    }

    #[tokio::test]
    async fn test_latest_is_cached() {
        let (fetcher, service) = service();
        service.latest(Board::Currencies).await.unwrap();
        service.latest(Board::Currencies).await.unwrap();
        assert_eq!(fetcher.latest_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_archive_uses_requested_date() {
        let (_, service) = service();
        let snapshot = service.archive(day(2024, 3, 15)).await.unwrap();

        assert_eq!(snapshot.date, day(2024, 3, 15));
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["date"], "2024-03-15");

        let codes: Vec<&str> = snapshot.prices.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["gbp", "usd"]);
    }

    #[tokio::test]
    async fn test_archive_is_cached() {
        let (fetcher, service) = service();
        service.archive(day(2024, 3, 15)).await.unwrap();
        service.archive(day(2024, 3, 15)).await.unwrap();
        service.archive(day(2024, 3, 16)).await.unwrap();
        assert_eq!(fetcher.archive_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_historical_keeps_only_requested_month() {
        let (fetcher, service) = service();
        let series = service.historical("USD", day(2024, 3, 1)).await.unwrap();

        let days: Vec<String> = series.keys().map(|d| d.format(DAY_FORMAT).to_string()).collect();
        assert_eq!(days, vec!["2024-03-01", "2024-03-02"]);

        // Same currency regardless of case shares the cache entry.
        service.historical("usd", day(2024, 3, 20)).await.unwrap();
        assert_eq!(fetcher.historical_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_historical_rejects_bad_currency_without_fetching() {
        let (fetcher, service) = service();
        let err = service.historical("u$d", day(2024, 3, 1)).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(fetcher.historical_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_archive_range_has_one_key_per_day() {
        let (_, service) = service();
        let range = service
            .archive_range(day(2024, 3, 1), day(2024, 3, 3))
            .await
            .unwrap();

        let keys: Vec<String> = range.keys().map(|d| d.format(DAY_FORMAT).to_string()).collect();
        assert_eq!(keys, vec!["2024-03-01", "2024-03-02", "2024-03-03"]);

        let single = service.archive(day(2024, 3, 2)).await.unwrap();
        assert_eq!(range[&day(2024, 3, 2)], single.into_table());

        let value = serde_json::to_value(&range).unwrap();
        assert!(value["2024-03-01"].get("date").is_none());
    }

    #[tokio::test]
    async fn test_archive_range_reuses_day_cache() {
        let (fetcher, service) = service();
        service.archive(day(2024, 3, 2)).await.unwrap();
        service
            .archive_range(day(2024, 3, 1), day(2024, 3, 3))
            .await
            .unwrap();
        service
            .archive_range(day(2024, 3, 2), day(2024, 3, 4))
            .await
            .unwrap();
        assert_eq!(fetcher.archive_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_reversed_range_is_rejected_without_fetching() {
        let (fetcher, service) = service();
        let err = service
            .archive_range(day(2024, 3, 3), day(2024, 3, 1))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(fetcher.archive_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_range_is_rejected() {
        let fetcher = Arc::new(FakeFetcher::default());
        let service = RatesService::with_fetcher(fetcher.clone()).with_max_range_days(3);

        assert!(service
            .archive_range(day(2024, 3, 1), day(2024, 3, 3))
            .await
            .is_ok());
        let err = service
            .archive_range(day(2024, 3, 1), day(2024, 3, 4))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(fetcher.archive_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_day_aborts_range() {
        let (fetcher, service) = service();
        fetcher.failing_days.lock().unwrap().insert(day(2024, 3, 2));

        let err = service
            .archive_range(day(2024, 3, 1), day(2024, 3, 3))
            .await
            .unwrap_err();
        assert!(err.is_upstream_error());
        // Day 3 is never requested once day 2 fails.
        assert_eq!(fetcher.archive_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_ttls() {
        let (fetcher, service) = service();
        let service = service.with_ttls(CacheTtls {
            latest: Duration::from_millis(50),
            archive: Duration::from_secs(60),
        });

        service.latest(Board::Coins).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        service.latest(Board::Coins).await.unwrap();
        assert_eq!(fetcher.latest_calls.load(Ordering::SeqCst), 2);
    }
}
