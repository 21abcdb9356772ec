//! Number formatting conventions.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Separators used to render a decimal number for a given locale.
///
/// Only the parts needed for fixed-fraction display are modelled: the
/// decimal separator and a thousands separator applied every three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberLocale {
    pub decimal_separator: char,
    pub group_separator: char,
}

/// Errors produced when parsing a locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLocaleError {
    #[error("malformed locale tag: {0:?}")]
    Malformed(String),
    #[error("unsupported locale: {0:?}")]
    Unsupported(String),
}

impl NumberLocale {
    /// `1,234.50`
    pub const EN_US: Self = Self::new('.', ',');
    /// `1.234,50`
    pub const DE_DE: Self = Self::new(',', '.');
    /// `1 234,50` (narrow no-break space)
    pub const FR_FR: Self = Self::new(',', '\u{202f}');
    /// `1’234.50`
    pub const DE_CH: Self = Self::new('.', '\u{2019}');
    /// `1 234,50` (no-break space)
    pub const RU_RU: Self = Self::new(',', '\u{a0}');

    pub const fn new(decimal_separator: char, group_separator: char) -> Self {
        Self {
            decimal_separator,
            group_separator,
        }
    }

    /// The locale of the current process.
    ///
    /// Reads `LC_ALL`, `LC_NUMERIC` and `LANG` in that order (the first
    /// non-empty one wins) and falls back to [`NumberLocale::EN_US`] when none
    /// is set or the value is not recognised.
    pub fn system() -> Self {
        Self::from_env_lookup(|key| std::env::var(key).ok())
    }

    fn from_env_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ["LC_ALL", "LC_NUMERIC", "LANG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.is_empty())
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Render `value` with between `min_fraction_digits` and
    /// `max_fraction_digits` fraction digits.
    ///
    /// The value is first rounded half away from zero to
    /// `max_fraction_digits`; trailing zeros beyond `min_fraction_digits` are
    /// then dropped. A value that rounds to zero is printed without a sign.
    pub fn format_decimal(
        &self,
        value: Decimal,
        min_fraction_digits: u32,
        max_fraction_digits: u32,
    ) -> String {
        let rounded =
            value.round_dp_with_strategy(max_fraction_digits, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let plain = rounded.abs().to_string();
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

        let mut fraction = fraction.to_owned();
        let min = min_fraction_digits as usize;
        while fraction.len() < min {
            fraction.push('0');
        }
        while fraction.len() > min && fraction.ends_with('0') {
            fraction.pop();
        }

        let mut out = String::with_capacity(plain.len() + integer.len() / 3 + 2);
        if negative {
            out.push('-');
        }
        self.push_grouped(&mut out, integer);
        if !fraction.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }
        out
    }

    fn push_grouped(&self, out: &mut String, digits: &str) {
        let len = digits.len();
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(digit);
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::EN_US
    }
}

impl FromStr for NumberLocale {
    type Err = ParseLocaleError;

    /// Accepts BCP-47 (`de-CH`) and POSIX (`de_CH.UTF-8@euro`) tags.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let base = tag.split(['.', '@']).next().unwrap_or_default();
        if base == "C" || base == "POSIX" {
            return Ok(Self::EN_US);
        }

        let mut parts = base.split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts.next().map(str::to_ascii_uppercase);

        if language.len() < 2 || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseLocaleError::Malformed(tag.to_owned()));
        }

        let locale = match (language.as_str(), region.as_deref()) {
            ("de", Some("CH" | "LI")) => Self::DE_CH,
            ("en" | "ja" | "zh" | "ko" | "he" | "th", _) => Self::EN_US,
            ("de" | "it" | "nl" | "id" | "tr" | "da" | "el", _) => Self::DE_DE,
            ("fr", _) => Self::FR_FR,
            ("ru" | "uk" | "cs" | "sk" | "sv" | "nb" | "fi", _) => Self::RU_RU,
            _ => return Err(ParseLocaleError::Unsupported(tag.to_owned())),
        };
        Ok(locale)
    }
}
