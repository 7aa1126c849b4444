//! Vendor client tying the components together.
//!
//! [`VendorClient`] is read-only after construction and can be shared across
//! tasks behind an `Arc`. Network access goes through the [`RateFeed`] and
//! [`PollTransport`] it was built with.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::amount::CoinAmount;
use crate::config::VendorConfig;
use crate::credentials::VendorCredentials;
use crate::currency::CurrencyConverter;
use crate::encoder::{PaymentEncoder, PaymentRequest, QrUrlBuilder};
use crate::payment_id::{EntropySource, IdentifierGenerator};
use crate::poll::{PollRequest, PollResult};
use crate::signature::{is_well_formed_signature, SignatureService, Verification};
use crate::transport::{PollTransport, RateFeed};
use crate::webhook::{WebhookNotification, WebhookOutcome};
use crate::{Result, VendorError};

/// A freshly created payment: the request and the QR image URL for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentTarget {
    /// The encoded request.
    pub request: PaymentRequest,
    /// QR image URL carrying [`PaymentRequest::canonical`].
    pub qr_url: String,
}

impl PaymentTarget {
    /// The canonical payment string.
    pub fn payment_string(&self) -> String {
        self.request.canonical()
    }
}

/// Client for vendor integrations.
///
/// # Example
///
/// ```rust,ignore
/// use etn_vendor::{VendorClient, VendorCredentials};
/// use rust_decimal_macros::dec;
///
/// let client = VendorClient::new(VendorCredentials::from_env())?;
/// let target = client.create_payment(dec!(9.95), "GBP", "0abc123def456", None).await?;
/// println!("{}", target.qr_url);
///
/// let result = client.confirm_payment_for(&target.request).await?;
/// if result.is_paid() {
///     println!("paid {:?}", result.amount);
/// }
/// ```
#[derive(Clone)]
pub struct VendorClient {
    credentials: VendorCredentials,
    config: VendorConfig,
    rates: Arc<dyn RateFeed>,
    poll: Arc<dyn PollTransport>,
    ids: IdentifierGenerator,
    qr: QrUrlBuilder,
    signatures: SignatureService,
}

impl VendorClient {
    /// Client talking to the production endpoints over HTTPS.
    #[cfg(feature = "http-client")]
    pub fn new(credentials: VendorCredentials) -> Result<Self> {
        Self::with_config(credentials, VendorConfig::default())
    }

    /// Client talking to the endpoints in `config` over HTTPS.
    #[cfg(feature = "http-client")]
    pub fn with_config(credentials: VendorCredentials, config: VendorConfig) -> Result<Self> {
        let http = Arc::new(crate::transport::HttpTransport::new(&config)?);
        Self::with_transports(credentials, config, http.clone(), http)
    }

    /// Client with explicit network collaborators.
    ///
    /// # Errors
    ///
    /// `Config` if the configuration does not validate.
    pub fn with_transports(
        credentials: VendorCredentials,
        config: VendorConfig,
        rates: Arc<dyn RateFeed>,
        poll: Arc<dyn PollTransport>,
    ) -> Result<Self> {
        config.validate()?;
        let qr = QrUrlBuilder::new(config.qr_url_template.clone())?;
        let window = i64::try_from(config.replay_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                VendorError::Config(format!(
                    "replay window of {}s is out of range",
                    config.replay_window_secs
                ))
            })?;
        let signatures = SignatureService::new().with_replay_window(window);

        Ok(Self {
            credentials,
            config,
            rates,
            poll,
            ids: IdentifierGenerator::new(),
            qr,
            signatures,
        })
    }

    /// Replace the payment id entropy source.
    pub fn with_entropy(mut self, source: Arc<dyn EntropySource>) -> Self {
        self.ids = IdentifierGenerator::with_source(source);
        self
    }

    /// Replace the signature service.
    pub fn with_signature_service(mut self, signatures: SignatureService) -> Self {
        self.signatures = signatures;
        self
    }

    /// The credentials in use.
    pub fn credentials(&self) -> &VendorCredentials {
        &self.credentials
    }

    /// The configuration in use.
    pub fn config(&self) -> &VendorConfig {
        &self.config
    }

    fn encoder(&self) -> PaymentEncoder {
        PaymentEncoder::with_parts(self.ids.clone(), self.qr.clone())
    }

    /// Fetch the current rates and convert `value` in `currency` to coins.
    #[tracing::instrument(skip(self))]
    pub async fn convert_currency(&self, value: Decimal, currency: &str) -> Result<CoinAmount> {
        let rates = self.rates.fetch_rates().await?;
        CurrencyConverter::convert(value, currency, &rates)
    }

    /// Encode a payment request for an amount already in coins.
    pub fn payment_request(
        &self,
        amount: Decimal,
        outlet: &str,
        payment_id: Option<&str>,
    ) -> Result<PaymentRequest> {
        self.encoder().encode(amount, outlet, payment_id)
    }

    /// QR image URL for `request`.
    pub fn qr_url(&self, request: &PaymentRequest) -> String {
        self.qr.url_for(request)
    }

    /// Convert a local price, encode the request and build its QR URL.
    ///
    /// The currency is checked before any network access. Errors from the
    /// rate feed, the conversion and the encoder are returned unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn create_payment(
        &self,
        amount: Decimal,
        currency: &str,
        outlet: &str,
        payment_id: Option<&str>,
    ) -> Result<PaymentTarget> {
        crate::currency::Currency::parse(currency)?;
        let coins = self.convert_currency(amount, currency).await?;
        let request = self.payment_request(coins.as_decimal(), outlet, payment_id)?;
        let qr_url = self.qr_url(&request);
        tracing::info!(payment = %request, "payment created");
        Ok(PaymentTarget { request, qr_url })
    }

    /// Sign `payload` with the API secret.
    pub fn generate_signature(&self, payload: &[u8]) -> Result<String> {
        let secret = self.credentials.require_secret()?;
        self.signatures.generate(payload, secret)
    }

    /// Verify a received payload against its signature.
    pub fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        self.signatures.verify(
            payload,
            signature,
            self.credentials.api_key(),
            self.credentials.api_secret(),
        )
    }

    /// Like [`Self::verify_signature`], reporting why a payload was rejected.
    pub fn check_signature(&self, payload: &[u8], signature: &str) -> Result<Verification> {
        self.signatures.check(
            payload,
            signature,
            self.credentials.api_key(),
            self.credentials.api_secret(),
        )
    }

    /// Authenticate an inbound webhook and parse it on success.
    pub fn authenticate_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome> {
        if !self.verify_signature(payload, signature)? {
            return Ok(WebhookOutcome::Rejected);
        }
        let notification = WebhookNotification::from_slice(payload)?;
        tracing::info!(payment_id = ?notification.payment_id, "webhook verified");
        Ok(WebhookOutcome::Verified(notification))
    }

    /// Ask the poll endpoint whether a payment has arrived.
    ///
    /// `payload` is sent byte for byte. Without a `signature` one is
    /// generated over `payload` with the API secret.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if the supplied signature is not 64 hex chars
    /// - `MissingSecret` / `InvalidPayload` when generating the signature
    /// - `NetworkFailure` / `NetworkTimeout` from the transport
    /// - `InvalidResponse` if the answer is not a poll result
    #[tracing::instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    pub async fn confirm_payment(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PollResult> {
        let signature = match signature {
            Some(signature) => signature.to_string(),
            None => self.generate_signature(payload)?,
        };
        if !is_well_formed_signature(&signature) {
            return Err(VendorError::InvalidSignature(
                "expected 64 hexadecimal characters".into(),
            ));
        }

        let body = self.poll.post_signed(payload, &signature).await?;
        let result = PollResult::from_slice(&body)?;
        tracing::debug!(status = result.status, "poll answered");
        Ok(result)
    }

    /// Poll for a specific payment request.
    pub async fn confirm_payment_for(&self, request: &PaymentRequest) -> Result<PollResult> {
        let body = PollRequest::for_payment(request).to_vec()?;
        self.confirm_payment(&body, None).await
    }
}

impl std::fmt::Debug for VendorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorClient")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
