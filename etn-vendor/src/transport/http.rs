//! HTTPS implementation of the rate feed and poll transport.

use std::time::Duration;

use async_trait::async_trait;

use super::{PollTransport, RateFeed};
use crate::config::VendorConfig;
use crate::currency::RateTable;
use crate::signature::SIGNATURE_HEADER;
use crate::{Result, VendorError};

/// reqwest-backed transport for the rate feed and the poll endpoint.
///
/// One client is shared by both operations, so connections are pooled.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: VendorConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the timeouts and endpoints in `config`.
    pub fn new(config: &VendorConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VendorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &VendorConfig {
        &self.config
    }

    fn map_reqwest_error(&self, e: reqwest::Error, operation: &str, target: &str) -> VendorError {
        if e.is_timeout() {
            VendorError::NetworkTimeout {
                operation: operation.to_string(),
                timeout_ms: self.config.timeout_secs * 1000,
            }
        } else {
            VendorError::network(target, e)
        }
    }
}

#[async_trait]
impl RateFeed for HttpTransport {
    async fn fetch_rates(&self) -> Result<RateTable> {
        let url = &self.config.rates_url;
        tracing::debug!(%url, "fetching exchange rates");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, "rate fetch", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VendorError::network(
                url.as_str(),
                format!("rate feed returned HTTP {}", status.as_u16()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e, "rate fetch", url))?;

        RateTable::from_slice(&body)
    }
}

#[async_trait]
impl PollTransport for HttpTransport {
    async fn post_signed(&self, body: &[u8], signature: &str) -> Result<Vec<u8>> {
        let url = &self.config.poll_url;
        tracing::debug!(%url, bytes = body.len(), "posting signed poll request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, "payment poll", url))?;

        // Error statuses still carry a JSON body with `status` and `message`.
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "poll endpoint returned error status");
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e, "payment poll", url))?;

        Ok(bytes.to_vec())
    }
}
