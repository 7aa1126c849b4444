//! Endpoint and protocol configuration.
//!
//! # Environment Variables
//!
//! [`VendorConfig::from_env`] starts from the defaults and overrides any of:
//!
//! - `ETN_VENDOR_POLL_URL` - payment confirmation endpoint
//! - `ETN_VENDOR_RATES_URL` - exchange-rate JSON document
//! - `ETN_VENDOR_QR_TEMPLATE` - QR image URL template containing `{data}`
//! - `ETN_VENDOR_TIMEOUT_SECS` - overall HTTP timeout
//! - `ETN_VENDOR_CONNECT_TIMEOUT_SECS` - HTTP connect timeout
//! - `ETN_VENDOR_REPLAY_WINDOW_SECS` - maximum webhook age

use serde::{Deserialize, Serialize};

use crate::{Result, VendorError};

/// Production payment confirmation endpoint.
pub const DEFAULT_POLL_URL: &str = "https://poll.electroneum.com/vendor/check-payment";

/// Production exchange-rate document.
pub const DEFAULT_RATES_URL: &str = "https://supply.electroneum.com/app-value-v2.json";

/// QR image service template. `{data}` receives the percent-encoded payment string.
pub const DEFAULT_QR_TEMPLATE: &str =
    "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data={data}";

/// Placeholder substituted in [`VendorConfig::qr_url_template`].
pub const QR_DATA_PLACEHOLDER: &str = "{data}";

/// Largest accepted webhook replay window (one week).
pub const MAX_REPLAY_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration shared by the vendor client and its HTTP transports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Payment confirmation endpoint (HTTP POST).
    #[serde(default = "default_poll_url")]
    pub poll_url: String,

    /// Exchange-rate document (HTTP GET).
    #[serde(default = "default_rates_url")]
    pub rates_url: String,

    /// QR image URL template; must contain `{data}`.
    #[serde(default = "default_qr_template")]
    pub qr_url_template: String,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Overall request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum age of a webhook timestamp, in seconds.
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: u64,
}

fn default_poll_url() -> String {
    DEFAULT_POLL_URL.to_string()
}

fn default_rates_url() -> String {
    DEFAULT_RATES_URL.to_string()
}

fn default_qr_template() -> String {
    DEFAULT_QR_TEMPLATE.to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_timeout() -> u64 {
    10
}

fn default_replay_window() -> u64 {
    300 // 5 minutes
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            poll_url: default_poll_url(),
            rates_url: default_rates_url(),
            qr_url_template: default_qr_template(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            replay_window_secs: default_replay_window(),
        }
    }
}

impl VendorConfig {
    /// Default production configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the defaults, then apply `ETN_VENDOR_*` overrides.
    ///
    /// Numeric variables that fail to parse are reported as `Config` errors
    /// rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("ETN_VENDOR_POLL_URL") {
            config.poll_url = url;
        }
        if let Ok(url) = std::env::var("ETN_VENDOR_RATES_URL") {
            config.rates_url = url;
        }
        if let Ok(template) = std::env::var("ETN_VENDOR_QR_TEMPLATE") {
            config.qr_url_template = template;
        }
        if let Some(secs) = env_secs("ETN_VENDOR_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(secs) = env_secs("ETN_VENDOR_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout_secs = secs;
        }
        if let Some(secs) = env_secs("ETN_VENDOR_REPLAY_WINDOW_SECS")? {
            config.replay_window_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the poll endpoint.
    pub fn with_poll_url(mut self, url: impl Into<String>) -> Self {
        self.poll_url = url.into();
        self
    }

    /// Set the rate feed URL.
    pub fn with_rates_url(mut self, url: impl Into<String>) -> Self {
        self.rates_url = url.into();
        self
    }

    /// Set the QR image URL template.
    pub fn with_qr_url_template(mut self, template: impl Into<String>) -> Self {
        self.qr_url_template = template.into();
        self
    }

    /// Set the overall request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the webhook replay window.
    pub fn with_replay_window(mut self, secs: u64) -> Self {
        self.replay_window_secs = secs;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.qr_url_template.contains(QR_DATA_PLACEHOLDER) {
            return Err(VendorError::Config(format!(
                "qr_url_template must contain {}",
                QR_DATA_PLACEHOLDER
            )));
        }
        if self.poll_url.is_empty() || self.rates_url.is_empty() {
            return Err(VendorError::Config("endpoint URLs must not be empty".into()));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(VendorError::Config("timeouts must be non-zero".into()));
        }
        if self.replay_window_secs > MAX_REPLAY_WINDOW_SECS {
            return Err(VendorError::Config(format!(
                "replay window of {}s exceeds {}s",
                self.replay_window_secs, MAX_REPLAY_WINDOW_SECS
            )));
        }
        Ok(())
    }
}

fn env_secs(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| VendorError::Config(format!("{}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VendorConfig::default();
        assert_eq!(config.poll_url, DEFAULT_POLL_URL);
        assert_eq!(config.rates_url, DEFAULT_RATES_URL);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.replay_window_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = VendorConfig::new()
            .with_poll_url("http://localhost:9000/poll")
            .with_rates_url("http://localhost:9000/rates.json")
            .with_timeout(3)
            .with_connect_timeout(1)
            .with_replay_window(60);
        assert_eq!(config.poll_url, "http://localhost:9000/poll");
        assert_eq!(config.rates_url, "http://localhost:9000/rates.json");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.connect_timeout_secs, 1);
        assert_eq!(config.replay_window_secs, 60);
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let config = VendorConfig::new().with_qr_url_template("https://qr.example.com/?d=");
        assert!(matches!(config.validate(), Err(VendorError::Config(_))));
    }

    #[test]
    fn test_replay_window_capped() {
        let config = VendorConfig::new().with_replay_window(MAX_REPLAY_WINDOW_SECS);
        assert!(config.validate().is_ok());

        let config = VendorConfig::new().with_replay_window(1_000_000_000_000_000);
        assert!(matches!(config.validate(), Err(VendorError::Config(_))));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: VendorConfig =
            serde_json::from_str(r#"{"poll_url": "http://localhost/poll"}"#).unwrap();
        assert_eq!(config.poll_url, "http://localhost/poll");
        assert_eq!(config.rates_url, DEFAULT_RATES_URL);
        assert_eq!(config.timeout_secs, 10);
    }
}
