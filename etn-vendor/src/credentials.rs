//! Vendor API credentials.

use std::fmt;

use zeroize::Zeroizing;

use crate::{Result, VendorError};

/// Environment variable holding the vendor API key.
pub const ENV_API_KEY: &str = "ETN_VENDOR_API_KEY";
/// Environment variable holding the vendor API secret.
pub const ENV_API_SECRET: &str = "ETN_VENDOR_API_SECRET";

/// API key and shared secret issued to a vendor account.
///
/// The secret is wiped from memory when the value is dropped and is never
/// shown by `Debug`. Either field may be empty: creating payment strings
/// needs neither, signing needs the secret, and webhook verification needs
/// both. Each operation checks what it uses.
#[derive(Clone)]
pub struct VendorCredentials {
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl VendorCredentials {
    /// Create credentials from an API key and secret.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Read credentials from `ETN_VENDOR_API_KEY` and `ETN_VENDOR_API_SECRET`.
    ///
    /// Unset variables become empty fields.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ENV_API_KEY).unwrap_or_default(),
            std::env::var(ENV_API_SECRET).unwrap_or_default(),
        )
    }

    /// The public API key, echoed in signed payloads as `key`.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The shared secret. Do not log.
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Whether both the key and the secret are set.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Return `(key, secret)` or `MissingCredentials` naming what is absent.
    pub fn require_complete(&self) -> Result<(&str, &str)> {
        match (self.api_key.is_empty(), self.api_secret.is_empty()) {
            (false, false) => Ok((self.api_key.as_str(), self.api_secret.as_str())),
            (true, true) => Err(VendorError::MissingCredentials("api key and api secret")),
            (true, false) => Err(VendorError::MissingCredentials("api key")),
            (false, true) => Err(VendorError::MissingCredentials("api secret")),
        }
    }

    /// Return the secret or `MissingSecret`.
    pub fn require_secret(&self) -> Result<&str> {
        if self.api_secret.is_empty() {
            return Err(VendorError::MissingSecret);
        }
        Ok(self.api_secret.as_str())
    }
}

impl fmt::Debug for VendorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}
