use std::sync::Arc;

use bonbast_market_data::{BonbastClient, CacheTtls, RatesFetcher, RatesService, ResponseCache};
use chrono::{Local, NaiveDate};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub rates_service: Arc<RatesService>,
}

impl AppState {
    /// Local calendar day, resolved per request so defaults never go stale.
    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == LogFormat::Json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let client = BonbastClient::new(&config.upstream_url, config.upstream_timeout)?;
    tracing::info!("Upstream {} in use: {}", client.id(), client.base_url());
    Ok(build_state_with_fetcher(config, Arc::new(client)))
}

/// Wire the service around any fetcher; tests pass a fake here.
pub fn build_state_with_fetcher(
    config: &Config,
    fetcher: Arc<dyn RatesFetcher>,
) -> Arc<AppState> {
    let cache = Arc::new(ResponseCache::new(config.cache_capacity));
    let rates_service = RatesService::new(fetcher, cache)
        .with_ttls(CacheTtls {
            latest: config.latest_ttl,
            archive: config.archive_ttl,
        })
        .with_max_range_days(config.max_range_days);

    Arc::new(AppState {
        rates_service: Arc::new(rates_service),
    })
}
