//! Payment identifiers.
//!
//! A payment id is 5 bytes from a secure random source, hex-encoded to 10
//! lowercase characters. Uniqueness is probabilistic (40 bits), not
//! guaranteed; the payment network matches on `(outlet, payment id)`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{Result, VendorError};

/// Number of random bytes in a payment id.
pub const PAYMENT_ID_BYTES: usize = 5;

/// Length of a payment id in hex characters.
pub const PAYMENT_ID_LEN: usize = PAYMENT_ID_BYTES * 2;

/// A 10 character hexadecimal payment identifier.
///
/// # Example
///
/// ```
/// use etn_vendor::PaymentId;
///
/// let id: PaymentId = "7ce25b4dc0".parse().unwrap();
/// assert_eq!(id.as_str(), "7ce25b4dc0");
/// assert!("7ce25b4dc".parse::<PaymentId>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentId(String);

impl PaymentId {
    /// Validate a caller-supplied id: exactly 10 ASCII hex digits.
    ///
    /// The id is kept as given; uppercase digits are accepted and preserved.
    pub fn parse(id: &str) -> Result<Self> {
        if id.len() != PAYMENT_ID_LEN || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VendorError::InvalidPaymentId(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// Encode raw bytes as a lowercase id.
    pub fn from_bytes(bytes: [u8; PAYMENT_ID_BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PaymentId {
    type Err = VendorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PaymentId {
    type Error = VendorError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PaymentId> for String {
    fn from(id: PaymentId) -> Self {
        id.0
    }
}

impl AsRef<str> for PaymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source of random bytes for payment ids.
///
/// Production code uses [`OsEntropy`]. Tests can inject a seeded source.
pub trait EntropySource: Send + Sync {
    /// Fill `dest` with random bytes.
    ///
    /// # Errors
    ///
    /// `EntropyUnavailable` if the source cannot produce bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// The operating system's CSPRNG (`getrandom(2)`, `BCryptGenRandom`, ...).
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| VendorError::EntropyUnavailable(e.to_string()))
    }
}

/// Generates fresh payment ids.
#[derive(Clone)]
pub struct IdentifierGenerator {
    source: Arc<dyn EntropySource>,
}

impl IdentifierGenerator {
    /// Generator backed by the operating system's secure random source.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsEntropy))
    }

    /// Generator backed by a custom source.
    pub fn with_source(source: Arc<dyn EntropySource>) -> Self {
        Self { source }
    }

    /// Draw a new payment id.
    ///
    /// # Errors
    ///
    /// `EntropyUnavailable` if the random source fails. There is no
    /// fallback to a non-secure generator.
    pub fn generate(&self) -> Result<PaymentId> {
        let mut bytes = [0u8; PAYMENT_ID_BYTES];
        self.source.fill(&mut bytes)?;
        Ok(PaymentId::from_bytes(bytes))
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentifierGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierGenerator").finish_non_exhaustive()
    }
}
