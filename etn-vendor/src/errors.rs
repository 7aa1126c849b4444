//! Error types for vendor operations.
//!
//! Every failure the library can raise is a [`VendorError`]. Authentication
//! outcomes of webhook verification (wrong key, bad MAC, stale timestamp) are
//! *not* errors: [`crate::SignatureService::verify`] reports them as
//! `Ok(false)`. Errors are reserved for malformed input and missing
//! configuration.

use thiserror::Error;

/// Numeric error codes for FFI and log aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum VendorErrorCode {
    /// Currency code not in the supported list
    UnsupportedCurrency = 1000,
    /// Rate feed document could not be parsed
    InvalidRateData = 1001,
    /// Rate feed has no entry for the currency
    RateNotFound = 1002,
    /// Rate present but not a positive number
    InvalidRate = 1003,
    /// Network/transport failure
    NetworkFailure = 2000,
    /// Network call timed out
    NetworkTimeout = 2001,
    /// Payment id is not 10 hex characters
    InvalidPaymentId = 3000,
    /// Amount is not a positive number
    InvalidAmount = 3001,
    /// Outlet is not a non-empty hex string
    InvalidOutlet = 3002,
    /// Secure random source failed
    EntropyUnavailable = 4000,
    /// API key or secret not configured
    MissingCredentials = 5000,
    /// API secret not configured
    MissingSecret = 5001,
    /// Payload is not a non-empty JSON object
    InvalidPayload = 5002,
    /// Signature is not 64 hex characters
    InvalidSignature = 5003,
    /// Poll endpoint response could not be parsed
    InvalidResponse = 6000,
    /// Invalid configuration
    Config = 9000,
}

/// Error type for vendor operations.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The currency code is not in [`crate::currency::SUPPORTED_CURRENCIES`].
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Connection failed or the remote answered with an error status.
    #[error("request to {target} failed: {reason}")]
    NetworkFailure {
        /// Endpoint URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// A network call exceeded its timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    NetworkTimeout {
        /// Operation that timed out
        operation: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The rate feed document is empty, malformed, or not a JSON object.
    #[error("invalid rate data: {0}")]
    InvalidRateData(String),

    /// The rate feed has no `price_<currency>` entry.
    #[error("currency rate not found: {0}")]
    RateNotFound(String),

    /// The rate entry exists but is not a positive finite number.
    #[error("invalid rate for {currency}: {rate}")]
    InvalidRate {
        /// Currency code
        currency: String,
        /// Raw rate value as found in the feed
        rate: String,
    },

    /// Payment id is not exactly 10 hex characters.
    #[error("invalid payment id: {0:?}")]
    InvalidPaymentId(String),

    /// Amount is missing, zero, negative or not numeric.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Outlet is empty or contains non-hex characters.
    #[error("invalid outlet: {0:?}")]
    InvalidOutlet(String),

    /// The platform's secure random source could not produce bytes.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// API key and/or secret are not configured.
    #[error("missing vendor credentials: {0}")]
    MissingCredentials(&'static str),

    /// API secret is not configured.
    #[error("no vendor API secret set")]
    MissingSecret,

    /// Payload is not a non-empty JSON object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Signature is not 64 hex characters.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The poll endpoint returned something other than a poll result.
    #[error("invalid poll response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl VendorError {
    /// Get the numeric error code.
    pub fn code(&self) -> VendorErrorCode {
        match self {
            Self::UnsupportedCurrency(_) => VendorErrorCode::UnsupportedCurrency,
            Self::NetworkFailure { .. } => VendorErrorCode::NetworkFailure,
            Self::NetworkTimeout { .. } => VendorErrorCode::NetworkTimeout,
            Self::InvalidRateData(_) => VendorErrorCode::InvalidRateData,
            Self::RateNotFound(_) => VendorErrorCode::RateNotFound,
            Self::InvalidRate { .. } => VendorErrorCode::InvalidRate,
            Self::InvalidPaymentId(_) => VendorErrorCode::InvalidPaymentId,
            Self::InvalidAmount(_) => VendorErrorCode::InvalidAmount,
            Self::InvalidOutlet(_) => VendorErrorCode::InvalidOutlet,
            Self::EntropyUnavailable(_) => VendorErrorCode::EntropyUnavailable,
            Self::MissingCredentials(_) => VendorErrorCode::MissingCredentials,
            Self::MissingSecret => VendorErrorCode::MissingSecret,
            Self::InvalidPayload(_) => VendorErrorCode::InvalidPayload,
            Self::InvalidSignature(_) => VendorErrorCode::InvalidSignature,
            Self::InvalidResponse(_) => VendorErrorCode::InvalidResponse,
            Self::Config(_) => VendorErrorCode::Config,
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// The library never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure { .. } | Self::NetworkTimeout { .. }
        )
    }

    /// Create a network failure error.
    pub fn network(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::NetworkFailure {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid rate error.
    pub fn invalid_rate(currency: impl Into<String>, rate: impl ToString) -> Self {
        Self::InvalidRate {
            currency: currency.into(),
            rate: rate.to_string(),
        }
    }
}
