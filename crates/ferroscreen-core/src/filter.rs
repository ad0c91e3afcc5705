//! Conjunctive record filtering.
//!
//! A [`FilterCriteria`] is built once per query and is read-only afterwards.
//! All active predicates must hold (logical AND); the output keeps input
//! order. An empty result is a normal outcome.

use serde::{Deserialize, Serialize};

use crate::{CanonicalRecord, ValidationError};

/// Label that means "do not filter on this field".
pub const ALL_LABEL: &str = "All";

/// Exact-match selection over an open label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Exactly(String),
}

impl Selection {
    /// Interpret a user-facing label.
    ///
    /// Blank labels and `"All"` in any letter case select everything; other
    /// labels are matched exactly after trimming.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL_LABEL) {
            Self::All
        } else {
            Self::Exactly(label.to_owned())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(expected) => expected == value,
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::from_label(value)
    }
}

impl From<Option<&str>> for Selection {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::All, Self::from_label)
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    lower: f64,
    upper: f64,
}

impl PriceRange {
    pub fn new(lower: f64, upper: f64) -> Result<Self, ValidationError> {
        if lower.is_nan() {
            return Err(ValidationError::NonFiniteValue { field: "min_price" });
        }
        if upper.is_nan() {
            return Err(ValidationError::NonFiniteValue { field: "max_price" });
        }
        if lower > upper {
            return Err(ValidationError::InvalidPriceRange { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// `[0, +inf]`.
    pub const fn unbounded() -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }

    pub const fn lower(self) -> f64 {
        self.lower
    }

    pub const fn upper(self) -> f64 {
        self.upper
    }

    pub fn contains(self, price: f64) -> bool {
        self.lower <= price && price <= self.upper
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Immutable set of predicates applied by [`FilterCriteria::apply`].
///
/// The default value passes every record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    sector: Selection,
    country: Selection,
    /// Same unit as [`CanonicalRecord::market_cap`].
    min_market_cap: f64,
    price_range: PriceRange,
    min_volume: u64,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sector(mut self, sector: impl Into<Selection>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<Selection>) -> Self {
        self.country = country.into();
        self
    }

    /// Floor in currency units; callers holding millions convert first
    /// (see [`market_cap_from_millions`]).
    pub fn with_min_market_cap(mut self, floor: f64) -> Result<Self, ValidationError> {
        validate_floor("min_market_cap", floor)?;
        self.min_market_cap = floor;
        Ok(self)
    }

    pub fn with_price_range(mut self, price_range: PriceRange) -> Self {
        self.price_range = price_range;
        self
    }

    pub fn with_min_volume(mut self, floor: u64) -> Self {
        self.min_volume = floor;
        self
    }

    pub fn sector(&self) -> &Selection {
        &self.sector
    }

    pub fn country(&self) -> &Selection {
        &self.country
    }

    pub const fn min_market_cap(&self) -> f64 {
        self.min_market_cap
    }

    pub const fn price_range(&self) -> PriceRange {
        self.price_range
    }

    pub const fn min_volume(&self) -> u64 {
        self.min_volume
    }

    /// Whether `record` satisfies every predicate.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.sector.matches(&record.sector)
            && self.country.matches(&record.country)
            && record.market_cap >= self.min_market_cap
            && self.price_range.contains(record.price)
            && record.volume >= self.min_volume
    }

    /// Order-preserving subsequence of `records` that matches.
    pub fn apply(&self, records: &[CanonicalRecord]) -> Vec<CanonicalRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Convert a market-cap floor expressed in millions into currency units.
pub fn market_cap_from_millions(millions: f64) -> f64 {
    millions * 1_000_000.0
}

fn validate_floor(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
