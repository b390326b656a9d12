use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sell/buy price pair for one currency or coin on one day.
///
/// Both prices are strictly positive. Build through [`PriceQuote::new`],
/// which refuses anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price the exchange sells at
    pub sell: i64,
    /// Price the exchange buys at
    pub buy: i64,
}

impl PriceQuote {
    /// Create a quote, returning `None` when either price is not positive.
    pub fn new(sell: i64, buy: i64) -> Option<Self> {
        (sell > 0 && buy > 0).then_some(Self { sell, buy })
    }
}

/// Lower-cased currency or coin code to its quote.
pub type CurrencyTable = BTreeMap<String, PriceQuote>;

/// One currency's quotes keyed by day.
pub type HistoricalSeries = BTreeMap<NaiveDate, PriceQuote>;

/// Archive tables keyed by day, without the per-snapshot `date` field.
pub type DateRangeResult = BTreeMap<NaiveDate, CurrencyTable>;

/// All currencies' quotes on one day.
///
/// Serialises flat: the currency codes and the `date` field share one
/// JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    /// The requested day, never the date text printed in the upstream table
    pub date: NaiveDate,
    #[serde(flatten)]
    pub prices: CurrencyTable,
}

impl ArchiveSnapshot {
    pub fn new(date: NaiveDate, mut prices: CurrencyTable) -> Self {
        // `date` is reserved for the snapshot day in the flat encoding.
        prices.remove("date");
        Self { date, prices }
    }

    /// Drop the date field, keeping only the table.
    pub fn into_table(self) -> CurrencyTable {
        self.prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_quote_rejects_non_positive() {
        assert!(PriceQuote::new(0, 10).is_none());
        assert!(PriceQuote::new(10, 0).is_none());
        assert!(PriceQuote::new(-5, 10).is_none());
        assert_eq!(
            PriceQuote::new(61200, 61100),
            Some(PriceQuote {
                sell: 61200,
                buy: 61100
            })
        );
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let mut prices = CurrencyTable::new();
        prices.insert("usd".to_string(), PriceQuote::new(61200, 61100).unwrap());
        let snapshot =
            ArchiveSnapshot::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), prices);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "date": "2024-03-15",
                "usd": { "sell": 61200, "buy": 61100 }
            })
        );

        let back: ArchiveSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_snapshot_drops_date_code() {
        let mut prices = CurrencyTable::new();
        prices.insert("date".to_string(), PriceQuote::new(1, 1).unwrap());
        let snapshot =
            ArchiveSnapshot::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), prices);
        assert!(snapshot.prices.is_empty());
    }

    #[test]
    fn test_range_keys_serialize_as_days() {
        let mut range = DateRangeResult::new();
        range.insert(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), CurrencyTable::new());
        let value = serde_json::to_value(&range).unwrap();
        assert_eq!(value, json!({ "2024-03-01": {} }));
    }
}
