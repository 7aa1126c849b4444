//! Electroneum vendor SDK.
//!
//! Builds instant-payment requests for point-of-sale vendors and
//! authenticates traffic with the payment network.
//!
//! # Features
//!
//! - **Payment ids**: 10 lowercase hex characters from injectable entropy
//! - **Conversion**: local price to coins through the published rate feed
//! - **Encoding**: `etn-it-<outlet>/<paymentId>/<amount>` and its QR image URL
//! - **Signatures**: HMAC-SHA256 over the exact payload bytes, with a replay
//!   window on verification
//! - **Client**: [`VendorClient`] wiring the above to the rate feed and the
//!   poll endpoint
//!
//! The pure components do no I/O. Network access is behind the
//! [`RateFeed`] and [`PollTransport`] traits; the `http-client` feature
//! (on by default) provides a reqwest implementation.
//!
//! # Example
//!
//! ```
//! use etn_vendor::{CurrencyConverter, PaymentEncoder, RateTable};
//! use rust_decimal::Decimal;
//!
//! let rates = RateTable::from_slice(br#"{"price_gbp": 0.005}"#).unwrap();
//! let coins = CurrencyConverter::convert(Decimal::new(995, 2), "GBP", &rates).unwrap();
//! assert_eq!(coins.to_string(), "1990.00");
//!
//! let request = PaymentEncoder::new()
//!     .encode(coins.as_decimal(), "0abc123def456", Some("7ce25b4dc0"))
//!     .unwrap();
//! assert_eq!(request.canonical(), "etn-it-0abc123def456/7ce25b4dc0/1990.00");
//! ```

pub mod amount;
pub mod client;
pub mod config;
pub mod credentials;
pub mod currency;
pub mod encoder;
pub mod errors;
pub mod payment_id;
pub mod poll;
pub mod prelude;
pub mod signature;
pub mod transport;
pub mod webhook;

/// Deterministic collaborators for tests.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::CoinAmount;
pub use client::{PaymentTarget, VendorClient};
pub use config::VendorConfig;
pub use credentials::VendorCredentials;
pub use currency::{Currency, CurrencyConverter, RateTable, SUPPORTED_CURRENCIES};
pub use encoder::{OutletId, PaymentEncoder, PaymentRequest, QrUrlBuilder};
pub use errors::{VendorError, VendorErrorCode};
pub use payment_id::{EntropySource, IdentifierGenerator, OsEntropy, PaymentId};
pub use poll::{PollRequest, PollResult};
pub use signature::{SignatureService, Verification, SIGNATURE_HEADER};
pub use transport::{PollTransport, RateFeed};
pub use webhook::{WebhookNotification, WebhookOutcome};

#[cfg(feature = "http-client")]
pub use transport::HttpTransport;

/// Common result alias for vendor operations.
pub type Result<T> = std::result::Result<T, VendorError>;
