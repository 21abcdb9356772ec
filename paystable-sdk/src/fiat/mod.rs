//! Fixed-point fiat amounts and their display formatting.
//!
//! Fiat amounts travel and are stored as integers scaled by
//! [`FIAT_SCALING_FACTOR`], so sums and comparisons elsewhere never pick up
//! binary floating-point error. They are turned into decimal fractions only at
//! the presentation boundary, by the functions in this module.
//!
//! The scale is the same for every currency: no per-currency decimal place
//! lookup is performed.

mod locale;

pub use locale::{NumberLocale, ParseLocaleError};

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Number of fraction digits carried by the internal representation.
pub const FIAT_MAX_FRACTION_DIGITS: u32 = 6;

/// `10^FIAT_MAX_FRACTION_DIGITS`: one major currency unit in scaled form.
pub const FIAT_SCALING_FACTOR: i64 = 10i64.pow(FIAT_MAX_FRACTION_DIGITS);

/// Fraction digits shown for fiat prices (both minimum and maximum).
const FIAT_VISUAL_FRACTION_DIGITS: u32 = 2;

/// Fraction digits shown for stable-asset amounts: `0..=6`.
const ASSET_VISUAL_MIN_FRACTION_DIGITS: u32 = 0;
const ASSET_VISUAL_MAX_FRACTION_DIGITS: u32 = 6;

/// A fiat amount scaled by [`FIAT_SCALING_FACTOR`].
///
/// Serialized as a bare JSON integer, the same way the merchant backend
/// sends product prices and order totals. Deserializing also accepts a finite
/// float (`1500000.0`), whose fractional part is truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct FiatAmount(i64);

impl FiatAmount {
    pub const ZERO: Self = Self(0);

    /// Wrap an already scaled amount.
    pub const fn from_scaled(scaled: i64) -> Self {
        Self(scaled)
    }

    /// Build an amount from whole major units (`12` → `12.000000`).
    ///
    /// Returns `None` on overflow.
    pub fn from_major_units(units: i64) -> Option<Self> {
        units.checked_mul(FIAT_SCALING_FACTOR).map(Self)
    }

    /// The raw scaled integer.
    pub const fn scaled(self) -> i64 {
        self.0
    }

    /// Exact decimal value in major units.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, FIAT_MAX_FRACTION_DIGITS)
    }

    /// See [`fiat_to_float`].
    pub fn to_float(self) -> f64 {
        fiat_to_float(self.0)
    }

    /// See [`fiat_to_human_friendly`].
    pub fn to_human_friendly(self, locale: &NumberLocale) -> String {
        fiat_to_human_friendly(self.0, locale)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Multiply by an item quantity.
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }
}

impl From<i64> for FiatAmount {
    fn from(scaled: i64) -> Self {
        Self(scaled)
    }
}

impl From<FiatAmount> for i64 {
    fn from(amount: FiatAmount) -> Self {
        amount.0
    }
}

impl<'de> Deserialize<'de> for FiatAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FiatAmountVisitor)
    }
}

struct FiatAmountVisitor;

impl Visitor<'_> for FiatAmountVisitor {
    type Value = FiatAmount;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a scaled fiat amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(FiatAmount(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(FiatAmount)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        let truncated = v.trunc();
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
            return Err(E::invalid_value(de::Unexpected::Float(v), &self));
        }
        Ok(FiatAmount(truncated as i64))
    }
}

impl std::fmt::Display for FiatAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Convert a scaled fiat amount into a floating-point major-unit value.
///
/// Never fails; the sign is preserved. Amounts beyond `2^53` lose precision,
/// as any `f64` would.
pub fn fiat_to_float(amount: i64) -> f64 {
    amount as f64 / FIAT_SCALING_FACTOR as f64
}

/// [`fiat_to_float`] for callers that hold the scaled amount as a float.
///
/// Any fractional part is discarded (truncated toward zero, never rounded)
/// before scaling down. NaN and infinite inputs are not guarded.
pub fn fiat_to_float_truncating(amount: f64) -> f64 {
    amount.trunc() / FIAT_SCALING_FACTOR as f64
}

/// Convert a scaled fiat amount into a human readable decimal fraction.
///
/// Always shows exactly two fraction digits and groups the integer part
/// according to `locale`. Rounding to two places is half away from zero,
/// applied to the exact decimal value (`1.005` → `1.01`).
///
/// A negative amount that rounds to zero is printed as `0.00`, without the
/// `-0.00` that browser `toLocaleString` formatting produces.
pub fn fiat_to_human_friendly(amount: i64, locale: &NumberLocale) -> String {
    locale.format_decimal(
        FiatAmount(amount).to_decimal(),
        FIAT_VISUAL_FRACTION_DIGITS,
        FIAT_VISUAL_FRACTION_DIGITS,
    )
}

/// [`fiat_to_human_friendly`] using the system locale.
pub fn fiat_to_human_friendly_default(amount: i64) -> String {
    fiat_to_human_friendly(amount, &NumberLocale::system())
}

/// Format a stable-asset amount (micro-units) with up to six fraction digits.
///
/// Trailing zeros are dropped: `1_500_000` → `1.5`, `2_000_000` → `2`.
pub fn asset_to_human_friendly(amount: i64, locale: &NumberLocale) -> String {
    locale.format_decimal(
        Decimal::new(amount, FIAT_MAX_FRACTION_DIGITS),
        ASSET_VISUAL_MIN_FRACTION_DIGITS,
        ASSET_VISUAL_MAX_FRACTION_DIGITS,
    )
}
