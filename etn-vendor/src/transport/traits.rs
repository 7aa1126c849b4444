use async_trait::async_trait;

use crate::currency::RateTable;
use crate::Result;

/// Source of exchange rates.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Fetch and parse the current rate document.
    ///
    /// # Errors
    ///
    /// `NetworkFailure` / `NetworkTimeout` if the document cannot be
    /// fetched, `InvalidRateData` if it cannot be parsed.
    async fn fetch_rates(&self) -> Result<RateTable>;
}

/// Delivery of signed poll requests to the payment confirmation endpoint.
#[async_trait]
pub trait PollTransport: Send + Sync {
    /// POST `body` with `signature` in the `ETN-SIGNATURE` header and return
    /// the raw response body.
    ///
    /// `body` must be sent byte for byte; the signature covers it exactly.
    async fn post_signed(&self, body: &[u8], signature: &str) -> Result<Vec<u8>>;
}
