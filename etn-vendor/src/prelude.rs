//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use etn_vendor::prelude::*;
//! ```

// Core types
pub use crate::amount::CoinAmount;
pub use crate::encoder::{PaymentEncoder, PaymentRequest};
pub use crate::payment_id::{IdentifierGenerator, PaymentId};

// Error handling
pub use crate::errors::{VendorError, VendorErrorCode};
pub use crate::Result;

// Conversion
pub use crate::currency::{CurrencyConverter, RateTable};

// Signing
pub use crate::signature::{SignatureService, Verification};
pub use crate::webhook::WebhookOutcome;

// Client
pub use crate::client::{PaymentTarget, VendorClient};
pub use crate::config::VendorConfig;
pub use crate::credentials::VendorCredentials;
pub use crate::poll::PollResult;
pub use crate::transport::{PollTransport, RateFeed};
