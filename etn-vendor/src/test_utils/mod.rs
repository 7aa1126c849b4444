//! Test utilities for the vendor SDK.
//!
//! Deterministic stand-ins for the injectable collaborators:
//! - entropy sources for payment ids
//! - a MAC that counts invocations and a fixed clock
//! - an in-memory rate feed and poll transport
//!
//! ## Usage
//!
//! ```rust,ignore
//! use etn_vendor::test_utils::{MockPollTransport, SeededEntropy, StaticRateFeed};
//!
//! let client = VendorClient::with_transports(credentials, config, feed, poll)?
//!     .with_entropy(Arc::new(SeededEntropy::new(42)));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::currency::RateTable;
use crate::payment_id::EntropySource;
use crate::signature::{Clock, HmacSha256, PayloadMac};
use crate::transport::{PollTransport, RateFeed};
use crate::{Result, VendorError};

/// Reproducible entropy from a seeded PRNG.
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    /// Source producing the same byte stream for the same seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| VendorError::EntropyUnavailable(e.to_string()))?;
        rng.fill_bytes(dest);
        Ok(())
    }
}

/// Entropy source that always fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingEntropy;

impl EntropySource for FailingEntropy {
    fn fill(&self, _dest: &mut [u8]) -> Result<()> {
        Err(VendorError::EntropyUnavailable(
            "entropy source disabled".into(),
        ))
    }
}

/// HMAC-SHA256 that records how often it ran.
#[derive(Debug, Default)]
pub struct CountingMac {
    calls: AtomicUsize,
}

impl CountingMac {
    /// Number of digests computed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PayloadMac for CountingMac {
    fn digest(&self, secret: &[u8], payload: &[u8]) -> Result<[u8; 32]> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        HmacSha256.digest(secret, payload)
    }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Rate feed serving a fixed table, or failing like an unreachable host.
#[derive(Debug, Default)]
pub struct StaticRateFeed {
    table: Option<RateTable>,
    calls: Arc<AtomicUsize>,
}

impl StaticRateFeed {
    /// Feed answering with `table`.
    pub fn new(table: RateTable) -> Self {
        Self {
            table: Some(table),
            calls: Arc::default(),
        }
    }

    /// Feed failing every fetch with `NetworkFailure`.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Shared counter of fetches, readable after the feed is moved.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl RateFeed for StaticRateFeed {
    async fn fetch_rates(&self) -> Result<RateTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .clone()
            .ok_or_else(|| VendorError::network("static-rate-feed", "feed unavailable"))
    }
}

/// Poll transport returning a canned body and recording what was sent.
#[derive(Debug, Default)]
pub struct MockPollTransport {
    response: Vec<u8>,
    requests: Mutex<Vec<(Vec<u8>, String)>>,
}

impl MockPollTransport {
    /// Transport answering every request with `response`.
    pub fn new(response: Vec<u8>) -> Self {
        Self {
            response,
            requests: Mutex::default(),
        }
    }

    /// `(body, signature)` pairs received so far.
    pub fn requests(&self) -> Vec<(Vec<u8>, String)> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PollTransport for MockPollTransport {
    async fn post_signed(&self, body: &[u8], signature: &str) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((body.to_vec(), signature.to_string()));
        }
        Ok(self.response.clone())
    }
}
