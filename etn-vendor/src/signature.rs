//! # Webhook Signatures
//!
//! ## Security Model
//!
//! Payloads are JSON objects signed with HMAC-SHA256 under the vendor's API
//! secret; the signature travels hex-encoded in the `ETN-SIGNATURE` header.
//! This module MUST provide:
//! - MAC over the exact bytes received (never a re-serialization)
//! - Constant-time comparison of digests
//! - Replay protection (payload `timestamp` no older than the window)
//! - Binding to the vendor (payload `key` equals the API key)
//!
//! ## Errors vs. verdicts
//!
//! [`SignatureService::verify`] returns `Ok(false)` for every authentication
//! failure: malformed signature, wrong key, MAC mismatch, stale or
//! unreadable timestamp. It returns `Err` only when the caller is at fault:
//! missing credentials or a payload that is not a non-empty JSON object.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{Result, VendorError};

/// HTTP header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "ETN-SIGNATURE";

/// Length of a hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Default maximum age of a signed payload.
pub const DEFAULT_REPLAY_WINDOW_SECS: i64 = 300;

/// Keyed digest over a payload.
///
/// [`HmacSha256`] is the only production implementation; the trait exists so
/// tests can observe whether the digest step ran.
pub trait PayloadMac: Send + Sync {
    /// Compute the 32-byte MAC of `payload` under `secret`.
    fn digest(&self, secret: &[u8], payload: &[u8]) -> Result<[u8; 32]>;
}

/// HMAC-SHA256.
#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha256;

impl PayloadMac for HmacSha256 {
    fn digest(&self, secret: &[u8], payload: &[u8]) -> Result<[u8; 32]> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret)
            .map_err(|e| VendorError::Config(format!("HMAC key rejected: {}", e)))?;
        mac.update(payload);
        let digest = mac.finalize().into_bytes();

        let mut result = [0u8; 32];
        result.copy_from_slice(&digest);
        Ok(result)
    }
}

/// Source of the current time for replay checks.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// JSON bytes together with their signature.
///
/// Send `body` exactly as stored; re-encoding the JSON would invalidate
/// `signature`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    /// The signed JSON bytes.
    pub body: Vec<u8>,
    /// Lowercase hex HMAC-SHA256 of `body`.
    pub signature: String,
}

/// Result of checking a signed payload, with the reason for rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// All checks passed.
    Valid,
    /// Signature is not 64 hex characters; no MAC was computed.
    MalformedSignature,
    /// Payload `key` is missing or differs from the API key.
    KeyMismatch,
    /// The MAC does not match.
    SignatureMismatch,
    /// Payload `timestamp` is missing or cannot be parsed.
    InvalidTimestamp,
    /// Payload `timestamp` is older than the replay window.
    Expired,
}

impl Verification {
    /// Whether the payload is authentic and fresh.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Short reason string for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::MalformedSignature => "malformed signature",
            Self::KeyMismatch => "api key mismatch",
            Self::SignatureMismatch => "signature mismatch",
            Self::InvalidTimestamp => "invalid timestamp",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates and verifies payload signatures.
#[derive(Clone)]
pub struct SignatureService {
    mac: Arc<dyn PayloadMac>,
    clock: Arc<dyn Clock>,
    replay_window: Duration,
}

impl SignatureService {
    /// HMAC-SHA256, wall clock, 5 minute replay window.
    pub fn new() -> Self {
        Self {
            mac: Arc::new(HmacSha256),
            clock: Arc::new(SystemClock),
            replay_window: Duration::seconds(DEFAULT_REPLAY_WINDOW_SECS),
        }
    }

    /// Replace the MAC implementation.
    pub fn with_mac(mut self, mac: Arc<dyn PayloadMac>) -> Self {
        self.mac = mac;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the maximum payload age.
    pub fn with_replay_window(mut self, window: Duration) -> Self {
        self.replay_window = window;
        self
    }

    /// The maximum payload age.
    pub fn replay_window(&self) -> Duration {
        self.replay_window
    }

    /// Sign `payload` exactly as given.
    ///
    /// # Errors
    ///
    /// - `MissingSecret` if `secret` is empty
    /// - `InvalidPayload` if `payload` is not a non-empty JSON object
    pub fn generate(&self, payload: &[u8], secret: &str) -> Result<String> {
        if secret.is_empty() {
            return Err(VendorError::MissingSecret);
        }
        parse_object(payload)?;
        let digest = self.mac.digest(secret.as_bytes(), payload)?;
        Ok(hex::encode(digest))
    }

    /// Serialize `value` once and sign the resulting bytes.
    pub fn sign_value(&self, value: &Value, secret: &str) -> Result<SignedPayload> {
        let body =
            serde_json::to_vec(value).map_err(|e| VendorError::InvalidPayload(e.to_string()))?;
        let signature = self.generate(&body, secret)?;
        Ok(SignedPayload { body, signature })
    }

    /// Check a received payload and report why it was rejected, if it was.
    ///
    /// Steps, in order:
    /// 1. credentials present (else `MissingCredentials`)
    /// 2. signature is 64 hex chars (else `MalformedSignature`, no MAC)
    /// 3. payload is a non-empty JSON object (else `InvalidPayload`)
    /// 4. payload `key` equals `api_key`
    /// 5. MAC over the received bytes matches, compared in constant time
    /// 6. payload `timestamp` is not older than the replay window
    ///
    /// Timestamps in the future are accepted.
    pub fn check(
        &self,
        payload: &[u8],
        signature: &str,
        api_key: &str,
        secret: &str,
    ) -> Result<Verification> {
        if api_key.is_empty() {
            return Err(VendorError::MissingCredentials("api key"));
        }
        if secret.is_empty() {
            return Err(VendorError::MissingCredentials("api secret"));
        }

        let Some(expected) = decode_signature(signature) else {
            return Ok(Verification::MalformedSignature);
        };

        let fields = parse_object(payload)?;

        match fields.get("key") {
            Some(Value::String(key)) if key == api_key => {}
            _ => return Ok(Verification::KeyMismatch),
        }

        let actual = self.mac.digest(secret.as_bytes(), payload)?;
        if !bool::from(actual[..].ct_eq(&expected[..])) {
            return Ok(Verification::SignatureMismatch);
        }

        let Some(timestamp) = fields.get("timestamp").and_then(parse_timestamp) else {
            return Ok(Verification::InvalidTimestamp);
        };
        // a window reaching past the earliest representable instant has no lower bound
        let oldest = self.clock.now().checked_sub_signed(self.replay_window);
        if oldest.is_some_and(|oldest| timestamp < oldest) {
            return Ok(Verification::Expired);
        }

        Ok(Verification::Valid)
    }

    /// Verify a received payload against its signature.
    ///
    /// See [`Self::check`] for the steps. Returns `Ok(false)` on any
    /// authentication failure.
    pub fn verify(
        &self,
        payload: &[u8],
        signature: &str,
        api_key: &str,
        secret: &str,
    ) -> Result<bool> {
        let verdict = self.check(payload, signature, api_key, secret)?;
        if !verdict.is_valid() {
            tracing::warn!(reason = %verdict, "signature verification failed");
        }
        Ok(verdict.is_valid())
    }
}

impl Default for SignatureService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignatureService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureService")
            .field("replay_window", &self.replay_window)
            .finish_non_exhaustive()
    }
}

/// Whether `signature` has the shape of a hex HMAC-SHA256 digest.
pub fn is_well_formed_signature(signature: &str) -> bool {
    signature.len() == SIGNATURE_HEX_LEN && signature.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_signature(signature: &str) -> Option<[u8; 32]> {
    if !is_well_formed_signature(signature) {
        return None;
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(signature, &mut bytes).ok()?;
    Some(bytes)
}

pub(crate) fn parse_object(payload: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(payload) {
        Ok(Value::Object(fields)) if !fields.is_empty() => Ok(fields),
        Ok(Value::Object(_)) => Err(VendorError::InvalidPayload("empty JSON object".into())),
        Ok(_) => Err(VendorError::InvalidPayload("expected a JSON object".into())),
        Err(e) => Err(VendorError::InvalidPayload(format!("not valid JSON: {}", e))),
    }
}

/// Parse a payload timestamp.
///
/// Accepts RFC 3339 strings, `YYYY-MM-DD HH:MM:SS` (read as UTC), and unix
/// seconds as a JSON integer or integer string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            s.parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
