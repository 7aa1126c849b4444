//! Payment confirmation polling payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::encoder::{OutletId, PaymentRequest, PAYMENT_STRING_PREFIX};
use crate::payment_id::PaymentId;
use crate::{Result, VendorError};

/// `status` value reported once the payment has been received.
pub const STATUS_PAID: i64 = 1;

/// `status` value reported while no payment has been seen.
pub const STATUS_PENDING: i64 = 0;

/// Body posted to the poll endpoint to ask about one payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRequest {
    /// `etn-it-<outlet>`
    pub vendor_address: String,
    /// The payment id being waited on.
    pub payment_id: String,
}

impl PollRequest {
    /// Poll body for a payment id at an outlet.
    pub fn new(outlet: &OutletId, payment_id: &PaymentId) -> Self {
        Self {
            vendor_address: format!("{}{}", PAYMENT_STRING_PREFIX, outlet),
            payment_id: payment_id.to_string(),
        }
    }

    /// Build the poll body for a payment request.
    pub fn for_payment(request: &PaymentRequest) -> Self {
        Self::new(request.outlet(), request.payment_id())
    }

    /// Serialize to the exact bytes that will be signed and sent.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| VendorError::InvalidPayload(e.to_string()))
    }
}

/// Answer from the poll endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    /// `1` once paid, `0` while pending; other values signal errors.
    pub status: i64,
    /// Amount received, when paid. Sent as a JSON number or string.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Human-readable explanation, mostly on errors.
    #[serde(default)]
    pub message: Option<String>,
}

impl PollResult {
    /// Parse the endpoint's response body.
    ///
    /// # Errors
    ///
    /// `InvalidResponse` if the body is not a JSON object with an integer
    /// `status`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| VendorError::InvalidResponse(e.to_string()))
    }

    /// Whether the payment has been received.
    pub fn is_paid(&self) -> bool {
        self.status == STATUS_PAID
    }

    /// Whether the endpoint has not seen the payment yet.
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}
