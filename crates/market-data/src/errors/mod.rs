//! Error types for the market data crate.
//!
//! Row-level anomalies inside an upstream table are never errors: they are
//! filtered by the row parser. Everything here aborts the whole request.

use thiserror::Error;

/// Errors that can occur while resolving, fetching or parsing exchange rates.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A caller-supplied parameter failed strict parsing.
    /// Surfaced to HTTP clients as 422.
    #[error("{0}")]
    InvalidInput(String),

    /// The upstream markup no longer has the structure we scrape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The upstream answered with a non-success status.
    #[error("Upstream request to {url} failed with status {status}")]
    Upstream {
        /// The address that was requested
        url: String,
        /// HTTP status code returned by the upstream
        status: u16,
    },

    /// The upstream answered successfully but refused to serve data.
    #[error("Upstream request to {url} was rejected: {reason}")]
    UpstreamRejected {
        /// The address that was requested
        url: String,
        /// Why the payload was considered a rejection
        reason: String,
    },

    /// A transport error occurred while talking to the upstream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether the error was caused by the caller rather than the upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether the error originated from talking to the upstream site.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::UpstreamRejected { .. } | Self::Network(_)
        )
    }
}
