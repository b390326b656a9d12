//! HTTP headers for bonbast.com requests

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT,
};

use crate::errors::MarketDataError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36";

/// Marks the board request as the page's own AJAX call.
pub const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Headers sent with every upstream request.
pub fn default_headers(base_url: &str) -> Result<HeaderMap, MarketDataError> {
    let origin = HeaderValue::from_str(base_url).map_err(|_| {
        MarketDataError::InvalidInput(format!("Invalid upstream address: {base_url}"))
    })?;
    let referer = HeaderValue::from_str(&format!("{base_url}/")).map_err(|_| {
        MarketDataError::InvalidInput(format!("Invalid upstream address: {base_url}"))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ORIGIN, origin);
    headers.insert(REFERER, referer);
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    Ok(headers)
}
