//! Local currency to coin conversion.
//!
//! The rate feed is a flat JSON object whose keys are `price_<currency>`
//! (lowercase) and whose values are the price of one coin in that currency,
//! as JSON numbers or numeric strings:
//!
//! ```json
//! { "price_gbp": 0.005, "price_usd": "0.0065" }
//! ```
//!
//! Fetching the document is the job of a [`crate::transport::RateFeed`];
//! this module only validates and computes, so it can be tested with
//! injected tables.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::amount::CoinAmount;
use crate::{Result, VendorError};

/// Currencies accepted for conversion.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "ARS", "AUD", "BDT", "BRL", "BTC", "CAD", "CDF", "CHF", "CLP", "CNY", "COP", "CZK", "DKK",
    "EGP", "EUR", "GBP", "GHS", "HKD", "HUF", "IDR", "ILS", "INR", "JPY", "KHR", "KRW", "MXN",
    "MYR", "NGN", "NOK", "NZD", "PHP", "PKR", "PLN", "RON", "RUB", "SEK", "SGD", "THB", "TRY",
    "TWD", "UAH", "USD", "VES", "VND", "ZAR",
];

/// Prefix of rate keys in the feed document.
pub const RATE_KEY_PREFIX: &str = "price_";

/// A supported currency code, stored uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Currency(&'static str);

impl Currency {
    /// Look up a currency code, case-insensitively.
    ///
    /// # Errors
    ///
    /// `UnsupportedCurrency` if the code is not in [`SUPPORTED_CURRENCIES`].
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        SUPPORTED_CURRENCIES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(trimmed))
            .map(|c| Self(*c))
            .ok_or_else(|| VendorError::UnsupportedCurrency(code.to_string()))
    }

    /// The uppercase code (e.g. `"GBP"`).
    pub fn code(&self) -> &'static str {
        self.0
    }

    /// The key of this currency in the rate feed (e.g. `"price_gbp"`).
    pub fn rate_key(&self) -> String {
        format!("{}{}", RATE_KEY_PREFIX, self.0.to_ascii_lowercase())
    }
}

impl FromStr for Currency {
    type Err = VendorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Exchange rates as published by the rate feed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RateTable {
    entries: Map<String, Value>,
}

impl RateTable {
    /// Parse the raw feed document.
    ///
    /// # Errors
    ///
    /// `InvalidRateData` if the body is empty, not JSON, or not an object.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(VendorError::InvalidRateData("empty document".into()));
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(entries)) => Ok(Self { entries }),
            Ok(other) => Err(VendorError::InvalidRateData(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(VendorError::InvalidRateData(e.to_string())),
        }
    }

    /// Build a table from `(key, value)` pairs, e.g. `("price_gbp", json!(0.005))`.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Number of entries in the document.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The price of one coin in `currency`.
    ///
    /// # Errors
    ///
    /// - `RateNotFound` if the key is absent or `null`
    /// - `InvalidRate` if the value is not a positive number
    pub fn rate_for(&self, currency: &Currency) -> Result<Decimal> {
        let key = currency.rate_key();
        let raw = match self.entries.get(&key) {
            None | Some(Value::Null) => {
                return Err(VendorError::RateNotFound(currency.code().to_string()))
            }
            Some(v) => v,
        };

        let rate = match raw {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
        .ok_or_else(|| VendorError::invalid_rate(currency.code(), raw))?;

        if rate <= Decimal::ZERO {
            return Err(VendorError::invalid_rate(currency.code(), raw));
        }
        Ok(rate)
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Converts local currency amounts to coin amounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrencyConverter;

impl CurrencyConverter {
    /// Convert `value` units of `currency` into coins at the table's rate.
    ///
    /// Computes `value / rate` in decimal arithmetic and rounds half away
    /// from zero to two places.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `value` is not positive
    /// - `UnsupportedCurrency`, `RateNotFound`, `InvalidRate` as per
    ///   [`Currency::parse`] and [`RateTable::rate_for`]
    ///
    /// # Examples
    ///
    /// ```rust
    /// use etn_vendor::{CurrencyConverter, RateTable};
    /// use rust_decimal::Decimal;
    /// use serde_json::json;
    ///
    /// let rates = RateTable::from_entries([("price_gbp", json!(0.005))]);
    /// let etn = CurrencyConverter::convert(Decimal::new(995, 2), "GBP", &rates).unwrap();
    /// assert_eq!(etn.to_string(), "1990.00");
    /// ```
    pub fn convert(value: Decimal, currency: &str, rates: &RateTable) -> Result<CoinAmount> {
        let currency = Currency::parse(currency)?;
        if value <= Decimal::ZERO {
            return Err(VendorError::InvalidAmount(format!(
                "{} {} is not a positive price",
                value, currency
            )));
        }

        let rate = rates.rate_for(&currency)?;
        let coins = value
            .checked_div(rate)
            .ok_or_else(|| {
                VendorError::InvalidAmount(format!(
                    "{} {} is too large to convert at {}",
                    value, currency, rate
                ))
            })?;

        let amount = CoinAmount::from_decimal(coins)?;
        tracing::debug!(%value, %currency, %rate, %amount, "converted to coins");
        Ok(amount)
    }
}
