//! Field parsing: heterogeneous raw values into typed numbers.
//!
//! Parsing never fails. Every [`FieldKind`] either yields a number or an
//! explicit [`FieldValue::Missing`] / [`FieldValue::Unparseable`] outcome, and
//! the field-specific resolvers collapse those outcomes into the documented
//! fallback: `0` for magnitudes (market cap, price, volume) and `None` for the
//! P/E ratio.
//!
//! | Input | market cap | price | volume | P/E |
//! |-------|-----------:|------:|-------:|----:|
//! | `"$1.5B"` | 1.5e9 | 0 | 0 | `None` |
//! | `"2,500,000"` | 2.5e6 | 2.5e6 | 2_500_000 | 2.5e6 |
//! | `""`, `"0"`, null | 0 | 0 | 0 | `None` |

use tracing::debug;

use crate::RawValue;

/// Magnitude suffixes in match order. A value containing several letters
/// only honours the first suffix found in this order.
const MAGNITUDE_SUFFIXES: [(char, f64); 4] = [
    ('K', 1e3),
    ('M', 1e6),
    ('B', 1e9),
    ('T', 1e12),
];

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// How a raw field should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Currency amount that may carry a K/M/B/T magnitude suffix.
    CurrencyWithSuffix,
    /// Plain currency amount (`$189.50`, `1,024.10`).
    Currency,
    /// Whole number with optional thousands separators.
    Integer,
    /// Ratio where zero or missing means "unknown".
    Ratio,
}

/// Outcome of parsing a single raw field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Value(f64),
    /// Null, blank, or the literal `"0"` marker.
    Missing,
    Unparseable,
}

impl FieldValue {
    /// Magnitude fallback: anything but a value becomes `0`.
    pub fn or_zero(self) -> f64 {
        match self {
            Self::Value(value) => value,
            Self::Missing | Self::Unparseable => 0.0,
        }
    }

    /// Ratio fallback: anything but a value becomes absent.
    pub fn into_option(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Unparseable => None,
        }
    }
}

/// Parse a raw value according to `kind`.
pub fn parse_field(raw: &RawValue, kind: FieldKind) -> FieldValue {
    match raw {
        RawValue::Null => FieldValue::Missing,
        RawValue::Number(number) => parse_number(*number, kind),
        RawValue::Text(text) => parse_text(text, kind),
    }
}

/// Market capitalisation in currency units; `0` when unparseable.
pub fn parse_market_cap(raw: &RawValue) -> f64 {
    resolve_magnitude("market_cap", raw, FieldKind::CurrencyWithSuffix)
}

/// Last sale price; `0` when unparseable.
pub fn parse_price(raw: &RawValue) -> f64 {
    resolve_magnitude("price", raw, FieldKind::Currency)
}

/// Share volume; `0` when unparseable. Fractional values are truncated.
pub fn parse_volume(raw: &RawValue) -> u64 {
    resolve_magnitude("volume", raw, FieldKind::Integer).trunc() as u64
}

/// Price/earnings ratio; `None` when missing, zero, or unparseable.
pub fn parse_pe_ratio(raw: &RawValue) -> Option<f64> {
    let parsed = parse_field(raw, FieldKind::Ratio);
    if parsed == FieldValue::Unparseable {
        debug!(field = "pe_ratio", value = ?raw, "unparseable ratio treated as absent");
    }
    parsed.into_option()
}

fn resolve_magnitude(field: &'static str, raw: &RawValue, kind: FieldKind) -> f64 {
    let parsed = parse_field(raw, kind);
    if parsed == FieldValue::Unparseable {
        debug!(field, value = ?raw, "unparseable magnitude replaced with 0");
    }
    parsed.or_zero()
}

fn parse_number(number: f64, kind: FieldKind) -> FieldValue {
    if !number.is_finite() {
        return FieldValue::Unparseable;
    }

    match kind {
        FieldKind::Ratio if number == 0.0 => FieldValue::Missing,
        FieldKind::Ratio => FieldValue::Value(number),
        _ if number < 0.0 => FieldValue::Unparseable,
        _ => FieldValue::Value(number),
    }
}

fn parse_text(text: &str, kind: FieldKind) -> FieldValue {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return FieldValue::Missing;
    }

    let cleaned = strip_currency_and_separators(trimmed);

    let parsed = match kind {
        FieldKind::CurrencyWithSuffix => parse_with_suffix(&cleaned),
        FieldKind::Currency | FieldKind::Ratio => cleaned.trim().parse::<f64>().ok(),
        FieldKind::Integer => parse_integer(cleaned.trim()),
    };

    match parsed {
        Some(number) => parse_number(number, kind),
        None => FieldValue::Unparseable,
    }
}

fn strip_currency_and_separators(text: &str) -> String {
    text.chars()
        .filter(|ch| *ch != ',' && !CURRENCY_SYMBOLS.contains(ch))
        .collect()
}

fn parse_with_suffix(cleaned: &str) -> Option<f64> {
    for (suffix, factor) in MAGNITUDE_SUFFIXES {
        if cleaned.contains(suffix) {
            let remainder = cleaned.replace(suffix, "");
            return remainder
                .trim()
                .parse::<f64>()
                .ok()
                .map(|value| value * factor);
        }
    }

    cleaned.trim().parse::<f64>().ok()
}

fn parse_integer(cleaned: &str) -> Option<f64> {
    if let Ok(whole) = cleaned.parse::<u64>() {
        return Some(whole as f64);
    }
    cleaned.parse::<f64>().ok()
}
