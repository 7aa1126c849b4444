//! Coin amounts in fixed-point decimal.
//!
//! Amounts are held as [`Decimal`] at a scale of exactly two fractional
//! digits, so the textual form is always `<int>.<2 digits>` with a `.`
//! separator. **Never use f64 for amounts.**
//!
//! Rounding is half away from zero (`12.345` → `12.35`, `12.344` → `12.34`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Result, VendorError};

/// Number of fractional digits in the canonical form.
pub const COIN_SCALE: u32 = 2;

/// Non-negative coin amount with two fractional digits.
///
/// # Examples
///
/// ```rust
/// use etn_vendor::CoinAmount;
/// use rust_decimal::Decimal;
///
/// let amt = CoinAmount::from_decimal(Decimal::new(123, 1)).unwrap();
/// assert_eq!(amt.to_string(), "12.30");
///
/// let amt: CoinAmount = "1990".parse().unwrap();
/// assert_eq!(amt.to_string(), "1990.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct CoinAmount {
    value: Decimal,
}

impl CoinAmount {
    /// Round `value` to two decimal places and wrap it.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if the value is negative, or too large to carry two
    /// fractional digits.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(VendorError::InvalidAmount(format!("{} is negative", value)));
        }
        let mut value =
            value.round_dp_with_strategy(COIN_SCALE, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(COIN_SCALE);
        if value.scale() != COIN_SCALE {
            return Err(VendorError::InvalidAmount(format!(
                "{} has too many digits for {} decimal places",
                value, COIN_SCALE
            )));
        }
        // -0.00 from rounding a tiny negative zero
        value.set_sign_positive(true);
        Ok(Self { value })
    }

    /// Parse a decimal string (e.g. `"12.3"`).
    ///
    /// Scientific notation (`"1.5e2"`) is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let value = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| VendorError::InvalidAmount(format!("{:?} is not a number", s)))?;
        Self::from_decimal(value)
    }

    /// Zero coins.
    pub fn zero() -> Self {
        let mut value = Decimal::ZERO;
        value.rescale(COIN_SCALE);
        Self { value }
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Whether this amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.value.is_zero()
    }

    /// Get the internal Decimal value (scale 2).
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Amount in the smallest unit (hundredths of a coin).
    ///
    /// Returns `None` if the value does not fit in a `u64`.
    pub fn as_cents(&self) -> Option<u64> {
        use rust_decimal::prelude::ToPrimitive;
        (self.value * Decimal::ONE_HUNDRED).to_u64()
    }
}

impl fmt::Display for CoinAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // scale is pinned to 2, so Decimal prints exactly two digits
        write!(f, "{}", self.value)
    }
}

impl FromStr for CoinAmount {
    type Err = VendorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for CoinAmount {
    type Error = VendorError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::from_decimal(value)
    }
}

impl From<CoinAmount> for Decimal {
    fn from(amount: CoinAmount) -> Self {
        amount.value
    }
}
