//! Inbound payment notifications.
//!
//! The network POSTs a JSON body to the vendor's webhook URL with the hex
//! signature in the `ETN-SIGNATURE` header. Answer 200 when the notification
//! verifies and 401 when it does not; see [`WebhookOutcome::http_status`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::signature::parse_timestamp;
use crate::{Result, VendorError};

/// HTTP status for a verified notification.
pub const STATUS_ACCEPTED: u16 = 200;

/// HTTP status for a rejected notification.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// A verified payment notification.
///
/// `key` and `timestamp` are mandated by the protocol. `amount` and
/// `payment_id` are the fields the network sends for payments; they are read
/// leniently, so a value of an unexpected type comes back as `None` rather
/// than failing the notification. Everything else is kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebhookNotification {
    /// API key the payload was issued for.
    pub key: String,
    /// Raw `timestamp` value as sent.
    pub timestamp: Value,
    /// Amount paid, in coins.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<Decimal>,
    /// Payment id of the paid request. Numeric ids are kept as their digits.
    #[serde(default, deserialize_with = "lenient_payment_id")]
    pub payment_id: Option<String>,
    /// Remaining payload fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookNotification {
    /// Parse a notification body.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| VendorError::InvalidPayload(e.to_string()))
    }

    /// The timestamp as a UTC instant, if it parses.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_payment_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Outcome of authenticating a webhook.
#[derive(Clone, Debug, PartialEq)]
pub enum WebhookOutcome {
    /// Signature, key and timestamp all check out.
    Verified(WebhookNotification),
    /// Authentication failed.
    Rejected,
}

impl WebhookOutcome {
    /// The HTTP status to answer the network with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Verified(_) => STATUS_ACCEPTED,
            Self::Rejected => STATUS_UNAUTHORIZED,
        }
    }

    /// Whether the notification was verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    /// The notification, if verified.
    pub fn notification(&self) -> Option<&WebhookNotification> {
        match self {
            Self::Verified(n) => Some(n),
            Self::Rejected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_notification() {
        let body = serde_json::to_vec(&json!({
            "key": "key_live_123",
            "timestamp": "2024-03-01T12:00:00Z",
            "amount": 1990.5,
            "payment_id": "7ce25b4dc0",
            "event": "payment",
        }))
        .unwrap();

        let n = WebhookNotification::from_slice(&body).unwrap();
        assert_eq!(n.key, "key_live_123");
        assert_eq!(n.amount, Some(dec!(1990.5)));
        assert_eq!(n.payment_id.as_deref(), Some("7ce25b4dc0"));
        assert_eq!(n.extra.get("event"), Some(&json!("payment")));
        assert!(n.timestamp_utc().is_some());
    }

    #[test]
    fn test_amount_as_string() {
        let n = WebhookNotification::from_slice(
            br#"{"key":"k","timestamp":1700000000,"amount":"12.30"}"#,
        )
        .unwrap();
        assert_eq!(n.amount, Some(dec!(12.30)));
        assert_eq!(n.payment_id, None);
    }

    #[test]
    fn test_unexpected_field_types_are_tolerated() {
        let n = WebhookNotification::from_slice(
            br#"{"key":"k","timestamp":1700000000,"payment_id":12345,"amount":{"value":"1.00"}}"#,
        )
        .unwrap();
        assert_eq!(n.payment_id.as_deref(), Some("12345"));
        assert_eq!(n.amount, None);

        let n = WebhookNotification::from_slice(
            br#"{"key":"k","timestamp":1,"payment_id":["a"],"amount":"lots"}"#,
        )
        .unwrap();
        assert_eq!(n.payment_id, None);
        assert_eq!(n.amount, None);
    }

    #[test]
    fn test_missing_key_is_invalid() {
        assert!(matches!(
            WebhookNotification::from_slice(br#"{"timestamp":1}"#),
            Err(VendorError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(WebhookOutcome::Rejected.http_status(), 401);
        let n = WebhookNotification::from_slice(br#"{"key":"k","timestamp":1}"#).unwrap();
        let outcome = WebhookOutcome::Verified(n);
        assert_eq!(outcome.http_status(), 200);
        assert!(outcome.notification().is_some());
    }
}
