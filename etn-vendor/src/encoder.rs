//! Canonical payment strings.
//!
//! A payment request is encoded as
//!
//! ```text
//! etn-it-<outlet>/<payment id>/<amount with 2 decimals>
//! ```
//!
//! e.g. `etn-it-0abc123def456/7ce25b4dc0/12.30`. The format is consumed by
//! the QR renderer and by the network's payment matcher; any deviation breaks
//! payment detection.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::CoinAmount;
use crate::config::{DEFAULT_QR_TEMPLATE, QR_DATA_PLACEHOLDER};
use crate::currency::{CurrencyConverter, RateTable};
use crate::payment_id::{IdentifierGenerator, PaymentId};
use crate::{Result, VendorError};

/// Prefix of every canonical payment string.
pub const PAYMENT_STRING_PREFIX: &str = "etn-it-";

/// A merchant outlet (point of sale) identifier: non-empty hex.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutletId(String);

impl OutletId {
    /// Validate an outlet id. Only the format is checked.
    pub fn parse(outlet: &str) -> Result<Self> {
        if outlet.is_empty() || !outlet.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VendorError::InvalidOutlet(outlet.to_string()));
        }
        Ok(Self(outlet.to_string()))
    }

    /// Get the outlet id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OutletId {
    type Error = VendorError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<OutletId> for String {
    fn from(outlet: OutletId) -> Self {
        outlet.0
    }
}

impl fmt::Display for OutletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, validated payment request.
///
/// Built by [`PaymentRequestBuilder`] or [`PaymentEncoder::encode`]; there
/// are no setters, so concurrent payment creations never share state.
/// Deserializing runs the same checks as [`PaymentRequestBuilder::build`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPaymentRequest")]
pub struct PaymentRequest {
    outlet: OutletId,
    payment_id: PaymentId,
    amount: CoinAmount,
}

impl PaymentRequest {
    /// Start building a request.
    pub fn builder() -> PaymentRequestBuilder {
        PaymentRequestBuilder::default()
    }

    /// The outlet receiving the payment.
    pub fn outlet(&self) -> &OutletId {
        &self.outlet
    }

    /// The payment id.
    pub fn payment_id(&self) -> &PaymentId {
        &self.payment_id
    }

    /// The amount in coins.
    pub fn amount(&self) -> CoinAmount {
        self.amount
    }

    /// `etn-it-<outlet>`, the vendor address used by the poll endpoint.
    pub fn vendor_address(&self) -> String {
        format!("{}{}", PAYMENT_STRING_PREFIX, self.outlet)
    }

    /// The canonical payment string.
    pub fn canonical(&self) -> String {
        format!(
            "{}{}/{}/{}",
            PAYMENT_STRING_PREFIX, self.outlet, self.payment_id, self.amount
        )
    }
}

/// Wire shape of a [`PaymentRequest`] before validation.
#[derive(Deserialize)]
struct RawPaymentRequest {
    outlet: String,
    payment_id: String,
    amount: Decimal,
}

impl TryFrom<RawPaymentRequest> for PaymentRequest {
    type Error = VendorError;

    fn try_from(raw: RawPaymentRequest) -> Result<Self> {
        // the id is always supplied, so nothing is drawn from the generator
        PaymentRequest::builder()
            .outlet(raw.outlet)
            .payment_id(raw.payment_id)
            .amount(raw.amount)
            .build(&IdentifierGenerator::new())
    }
}

impl fmt::Display for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Collects the parts of a payment request and validates them in `build`.
#[derive(Clone, Debug, Default)]
pub struct PaymentRequestBuilder {
    outlet: Option<String>,
    payment_id: Option<String>,
    amount: Option<Decimal>,
}

impl PaymentRequestBuilder {
    /// Set the outlet id.
    pub fn outlet(mut self, outlet: impl Into<String>) -> Self {
        self.outlet = Some(outlet.into());
        self
    }

    /// Set an explicit payment id. Without one, `build` generates an id.
    pub fn payment_id(mut self, payment_id: impl Into<String>) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    /// Set the coin amount.
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Validate the parts and produce the request.
    ///
    /// Checks run in order: supplied payment id, amount, outlet. An id is
    /// only drawn from `ids` once everything else is valid.
    ///
    /// # Errors
    ///
    /// - `InvalidPaymentId` if a supplied id is not 10 hex characters
    /// - `InvalidAmount` if the amount is missing or not positive after
    ///   rounding to two places
    /// - `InvalidOutlet` if the outlet is missing, empty or not hex
    /// - `EntropyUnavailable` if an id must be generated and cannot be
    pub fn build(self, ids: &IdentifierGenerator) -> Result<PaymentRequest> {
        let supplied_id = self.payment_id.as_deref().map(PaymentId::parse).transpose()?;

        let raw_amount = self
            .amount
            .ok_or_else(|| VendorError::InvalidAmount("missing".into()))?;
        let amount = CoinAmount::from_decimal(raw_amount)?;
        if !amount.is_positive() {
            return Err(VendorError::InvalidAmount(format!(
                "{} is not a positive amount",
                raw_amount
            )));
        }

        let outlet = OutletId::parse(self.outlet.as_deref().unwrap_or_default())?;

        let payment_id = match supplied_id {
            Some(id) => id,
            None => ids.generate()?,
        };

        Ok(PaymentRequest {
            outlet,
            payment_id,
            amount,
        })
    }
}

/// Builds QR image URLs from a template such as
/// `https://api.qrserver.com/v1/create-qr-code/?size=300x300&data={data}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrUrlBuilder {
    template: String,
}

impl QrUrlBuilder {
    /// Create a builder from a template containing `{data}`.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(QR_DATA_PLACEHOLDER) {
            return Err(VendorError::Config(format!(
                "QR template {:?} has no {} placeholder",
                template, QR_DATA_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// The URL of a QR image showing `data`, percent-encoded.
    pub fn url_for_str(&self, data: &str) -> String {
        self.template
            .replace(QR_DATA_PLACEHOLDER, &urlencoding::encode(data))
    }

    /// The URL of a QR image for a payment request.
    pub fn url_for(&self, request: &PaymentRequest) -> String {
        self.url_for_str(&request.canonical())
    }
}

impl Default for QrUrlBuilder {
    fn default() -> Self {
        Self {
            template: DEFAULT_QR_TEMPLATE.to_string(),
        }
    }
}

/// Turns amounts, outlets and payment ids into payment requests.
#[derive(Clone, Debug, Default)]
pub struct PaymentEncoder {
    ids: IdentifierGenerator,
    qr: QrUrlBuilder,
}

impl PaymentEncoder {
    /// Encoder with the OS random source and the default QR template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder with explicit collaborators.
    pub fn with_parts(ids: IdentifierGenerator, qr: QrUrlBuilder) -> Self {
        Self { ids, qr }
    }

    /// The QR URL builder in use.
    pub fn qr(&self) -> &QrUrlBuilder {
        &self.qr
    }

    /// Validate and encode a payment request.
    ///
    /// A missing `payment_id` is generated. Pure apart from that branch:
    /// the same inputs with an explicit id always give the same request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use etn_vendor::PaymentEncoder;
    /// use rust_decimal::Decimal;
    ///
    /// let request = PaymentEncoder::new()
    ///     .encode(Decimal::new(123, 1), "0abc123def456", Some("7ce25b4dc0"))
    ///     .unwrap();
    /// assert_eq!(request.canonical(), "etn-it-0abc123def456/7ce25b4dc0/12.30");
    /// ```
    pub fn encode(
        &self,
        amount: Decimal,
        outlet: &str,
        payment_id: Option<&str>,
    ) -> Result<PaymentRequest> {
        let mut builder = PaymentRequest::builder().amount(amount).outlet(outlet);
        if let Some(id) = payment_id {
            builder = builder.payment_id(id);
        }
        let request = builder.build(&self.ids)?;
        tracing::debug!(payment = %request, "encoded payment request");
        Ok(request)
    }

    /// Like [`Self::encode`], with the amount given as a decimal string.
    pub fn encode_str(
        &self,
        amount: &str,
        outlet: &str,
        payment_id: Option<&str>,
    ) -> Result<PaymentRequest> {
        let amount = CoinAmount::parse(amount)?;
        self.encode(amount.as_decimal(), outlet, payment_id)
    }

    /// Convert a local price, encode it, and return the QR image URL.
    pub fn encode_from_currency(
        &self,
        amount: Decimal,
        currency: &str,
        rates: &RateTable,
        outlet: &str,
        payment_id: Option<&str>,
    ) -> Result<String> {
        let coins = CurrencyConverter::convert(amount, currency, rates)?;
        let request = self.encode(coins.as_decimal(), outlet, payment_id)?;
        Ok(self.qr.url_for(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingEntropy, SeededEntropy};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    const OUTLET: &str = "0abc123def456";
    const PAYMENT_ID: &str = "7ce25b4dc0";

    #[test]
    fn test_reference_encoding() {
        let request = PaymentEncoder::new()
            .encode(dec!(12.3), OUTLET, Some(PAYMENT_ID))
            .unwrap();
        assert_eq!(request.canonical(), "etn-it-0abc123def456/7ce25b4dc0/12.30");
        assert_eq!(request.to_string(), request.canonical());
        assert_eq!(request.vendor_address(), "etn-it-0abc123def456");
        assert_eq!(request.amount().to_string(), "12.30");
    }

    #[test]
    fn test_encode_is_pure() {
        let encoder = PaymentEncoder::new();
        let a = encoder.encode(dec!(5), OUTLET, Some(PAYMENT_ID)).unwrap();
        let b = encoder.encode(dec!(5), OUTLET, Some(PAYMENT_ID)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_generated_payment_id() {
        let ids = IdentifierGenerator::with_source(Arc::new(SeededEntropy::new(1)));
        let encoder = PaymentEncoder::with_parts(ids, QrUrlBuilder::default());
        let request = encoder.encode(dec!(1), OUTLET, None).unwrap();
        assert_eq!(request.payment_id().as_str().len(), 10);
        assert!(request
            .canonical()
            .starts_with("etn-it-0abc123def456/"));
        assert!(request.canonical().ends_with("/1.00"));
    }

    #[test]
    fn test_invalid_payment_id() {
        let encoder = PaymentEncoder::new();
        for id in ["", "123", "7ce25b4dc0a", "zzzzzzzzzz"] {
            let err = encoder.encode(dec!(1), OUTLET, Some(id)).unwrap_err();
            assert!(matches!(err, VendorError::InvalidPaymentId(_)), "{:?}", id);
        }
    }

    #[test]
    fn test_invalid_amount() {
        let encoder = PaymentEncoder::new();
        for amount in [dec!(0), dec!(-1), dec!(0.004)] {
            let err = encoder.encode(amount, OUTLET, Some(PAYMENT_ID)).unwrap_err();
            assert!(matches!(err, VendorError::InvalidAmount(_)), "{}", amount);
        }
        let err = encoder.encode_str("abc", OUTLET, Some(PAYMENT_ID)).unwrap_err();
        assert!(matches!(err, VendorError::InvalidAmount(_)));
    }

    #[test]
    fn test_amount_without_room_for_decimals() {
        let err = PaymentEncoder::new()
            .encode(Decimal::MAX, "0abc", Some(PAYMENT_ID))
            .unwrap_err();
        assert!(matches!(err, VendorError::InvalidAmount(_)));
    }

    #[test]
    fn test_invalid_outlet() {
        let encoder = PaymentEncoder::new();
        for outlet in ["", "0abc-123", "outlet", "0abc 123"] {
            let err = encoder.encode(dec!(1), outlet, Some(PAYMENT_ID)).unwrap_err();
            assert!(matches!(err, VendorError::InvalidOutlet(_)), "{:?}", outlet);
        }
    }

    #[test]
    fn test_builder_missing_parts() {
        let ids = IdentifierGenerator::new();
        let err = PaymentRequest::builder().outlet(OUTLET).build(&ids).unwrap_err();
        assert!(matches!(err, VendorError::InvalidAmount(_)));

        let err = PaymentRequest::builder().amount(dec!(1)).build(&ids).unwrap_err();
        assert!(matches!(err, VendorError::InvalidOutlet(_)));
    }

    #[test]
    fn test_id_not_drawn_when_inputs_invalid() {
        let ids = IdentifierGenerator::with_source(Arc::new(FailingEntropy));
        let err = PaymentRequest::builder()
            .amount(dec!(1))
            .outlet("not-hex")
            .build(&ids)
            .unwrap_err();
        assert!(matches!(err, VendorError::InvalidOutlet(_)));

        let err = PaymentRequest::builder()
            .amount(dec!(1))
            .outlet(OUTLET)
            .build(&ids)
            .unwrap_err();
        assert!(matches!(err, VendorError::EntropyUnavailable(_)));
    }

    #[test]
    fn test_qr_url_percent_encodes() {
        let request = PaymentEncoder::new()
            .encode(dec!(12.3), OUTLET, Some(PAYMENT_ID))
            .unwrap();
        let url = QrUrlBuilder::default().url_for(&request);
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data=etn-it-0abc123def456%2F7ce25b4dc0%2F12.30"
        );
    }

    #[test]
    fn test_qr_template_requires_placeholder() {
        assert!(QrUrlBuilder::new("https://qr.example.com/{data}.png").is_ok());
        assert!(matches!(
            QrUrlBuilder::new("https://qr.example.com/"),
            Err(VendorError::Config(_))
        ));
    }

    #[test]
    fn test_encode_from_currency() {
        let rates = RateTable::from_entries([("price_gbp", json!(0.005))]);
        let url = PaymentEncoder::new()
            .encode_from_currency(dec!(9.95), "GBP", &rates, OUTLET, Some(PAYMENT_ID))
            .unwrap();
        assert!(url.ends_with("data=etn-it-0abc123def456%2F7ce25b4dc0%2F1990.00"));
    }

    #[test]
    fn test_request_serialization() {
        let request = PaymentEncoder::new()
            .encode(dec!(12.3), OUTLET, Some(PAYMENT_ID))
            .unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"outlet": OUTLET, "payment_id": PAYMENT_ID, "amount": "12.30"})
        );
        let parsed: PaymentRequest = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_deserialize_validates() {
        for body in [
            r#"{"outlet":"0abc","payment_id":"7ce25b4dc0","amount":"0"}"#,
            r#"{"outlet":"0abc","payment_id":"7ce25b4dc0","amount":"-5"}"#,
            r#"{"outlet":"zz","payment_id":"7ce25b4dc0","amount":"1"}"#,
            r#"{"outlet":"0abc","payment_id":"short","amount":"1"}"#,
        ] {
            assert!(serde_json::from_str::<PaymentRequest>(body).is_err(), "{}", body);
        }
    }
}
