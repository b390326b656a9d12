//! Upstream providers.
//!
//! - `traits` - The [`RatesFetcher`] trait the service layer depends on
//! - `bonbast` - Scraping client for bonbast.com

pub mod bonbast;
mod traits;

pub use bonbast::BonbastClient;
pub use traits::RatesFetcher;
