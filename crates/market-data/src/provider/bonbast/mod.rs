//! bonbast.com client.
//!
//! Archive and historical data come from server-rendered HTML pages
//! requested with form posts. The live board comes from the site's own
//! JSON endpoint, which needs a token scraped from the home page first.

pub mod headers;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::params::DAY_FORMAT;
use crate::parser::latest::{extract_token, rejection_reason, LatestPayload};
use crate::provider::RatesFetcher;

use self::headers::{default_headers, X_REQUESTED_WITH};

/// Provider ID constant
const PROVIDER_ID: &str = "BONBAST";

/// Public address of the upstream site
pub const DEFAULT_BASE_URL: &str = "https://www.bonbast.com";

/// Default HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Scraping client for bonbast.com.
///
/// # Example
///
/// ```ignore
/// use bonbast_market_data::provider::bonbast::{BonbastClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
///
/// let client = BonbastClient::new(DEFAULT_BASE_URL, REQUEST_TIMEOUT)?;
/// let page = client.fetch_archive_page(day).await?;
/// ```
#[derive(Clone)]
pub struct BonbastClient {
    client: Client,
    base_url: String,
}

impl BonbastClient {
    /// Create a client for the site at `base_url` (no trailing slash needed).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .default_headers(default_headers(&base_url)?)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, turning non-success statuses into [`MarketDataError::Upstream`].
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, MarketDataError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Upstream request to {} failed: {}", url, status);
            return Err(MarketDataError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn post_page(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<String, MarketDataError> {
        let url = self.url(path);
        log::debug!("POST {} {:?}", url, form);
        let response = self.send(self.client.post(&url).form(form), &url).await?;
        Ok(response.text().await?)
    }

    async fn fetch_token(&self) -> Result<String, MarketDataError> {
        let url = self.url("/");
        let response = self.send(self.client.get(&url), &url).await?;
        let page = response.text().await?;
        extract_token(&page)
    }
}

#[async_trait]
impl RatesFetcher for BonbastClient {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_latest(&self) -> Result<LatestPayload, MarketDataError> {
        let token = self.fetch_token().await?;

        let url = self.url("/json");
        let request = self
            .client
            .post(&url)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .form(&[("param", token.as_str())]);
        let payload: LatestPayload = self.send(request, &url).await?.json().await?;

        if let Some(reason) = rejection_reason(&payload) {
            return Err(MarketDataError::UpstreamRejected { url, reason });
        }
        Ok(payload)
    }

    async fn fetch_historical_page(
        &self,
        currency: &str,
        month: NaiveDate,
    ) -> Result<String, MarketDataError> {
        let date = month.format(DAY_FORMAT).to_string();
        self.post_page("/historical", &[("date", date.as_str()), ("currency", currency)])
            .await
    }

    async fn fetch_archive_page(&self, day: NaiveDate) -> Result<String, MarketDataError> {
        let date = day.format(DAY_FORMAT).to_string();
        self.post_page("/archive", &[("date", date.as_str())])
            .await
    }
}
