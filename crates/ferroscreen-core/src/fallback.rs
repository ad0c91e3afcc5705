//! Synthetic record generation used when the upstream source is unavailable
//! or returns too few rows.
//!
//! Randomness comes from an injected [`fastrand::Rng`], so a seeded generator
//! is fully reproducible:
//!
//! ```rust
//! use ferroscreen_core::{FallbackConfig, FallbackGenerator, UtcDateTime};
//!
//! let as_of = UtcDateTime::parse("2024-01-01T00:00:00Z").unwrap();
//! let mut a = FallbackGenerator::seeded(FallbackConfig::default(), 7).unwrap();
//! let mut b = FallbackGenerator::seeded(FallbackConfig::default(), 7).unwrap();
//! assert_eq!(a.generate(5, as_of), b.generate(5, as_of));
//! ```

use serde::{Deserialize, Serialize};

use crate::{CanonicalRecord, Symbol, SymbolPrefix, UtcDateTime, ValidationError};

/// Closed interval sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: f64,
    pub max: f64,
}

impl UniformRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(self, field: &'static str) -> Result<(), ValidationError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if self.min < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
        if self.min > self.max {
            return Err(ValidationError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn sample(self, rng: &mut fastrand::Rng) -> f64 {
        self.min + (self.max - self.min) * rng.f64()
    }
}

/// Vocabularies and value ranges for synthetic records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub symbol_prefix: SymbolPrefix,
    pub company_prefix: String,
    pub sectors: Vec<String>,
    pub countries: Vec<String>,
    pub market_cap: UniformRange,
    pub price: UniformRange,
    pub volume_min: u64,
    pub volume_max: u64,
    pub pe_ratio: UniformRange,
    /// Probability that a generated record carries a P/E ratio.
    pub pe_presence: f64,
    /// `{symbol}` is replaced with the generated symbol.
    pub source_url_template: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            symbol_prefix: SymbolPrefix::default(),
            company_prefix: String::from("Example Corp"),
            sectors: to_owned_list(&[
                "Technology",
                "Healthcare",
                "Financials",
                "Energy",
                "Industrials",
                "Consumer",
            ]),
            countries: to_owned_list(&[
                "United States",
                "Canada",
                "United Kingdom",
                "Germany",
                "Japan",
                "China",
            ]),
            market_cap: UniformRange::new(100_000_000.0, 50_000_000_000.0),
            price: UniformRange::new(10.0, 500.0),
            volume_min: 100_000,
            volume_max: 10_000_000,
            pe_ratio: UniformRange::new(5.0, 50.0),
            pe_presence: 0.9,
            source_url_template: String::from("https://finance.yahoo.com/quote/{symbol}"),
        }
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sectors.is_empty() {
            return Err(ValidationError::EmptyVocabulary { field: "sectors" });
        }
        if self.countries.is_empty() {
            return Err(ValidationError::EmptyVocabulary { field: "countries" });
        }

        self.market_cap.validate("market_cap")?;
        self.price.validate("price")?;
        self.pe_ratio.validate("pe_ratio")?;

        if self.volume_min > self.volume_max {
            return Err(ValidationError::InvalidRange {
                field: "volume",
                min: self.volume_min as f64,
                max: self.volume_max as f64,
            });
        }

        if !(0.0..=1.0).contains(&self.pe_presence) {
            return Err(ValidationError::InvalidProbability {
                field: "pe_presence",
                value: self.pe_presence,
            });
        }

        Ok(())
    }
}

/// Produces well-formed synthetic [`CanonicalRecord`]s.
///
/// Symbols continue across calls (`TICK001`, `TICK002`, ...), so every record
/// from one generator is unique.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    config: FallbackConfig,
    rng: fastrand::Rng,
    next_index: usize,
}

impl FallbackGenerator {
    /// Generator over an injected random source.
    pub fn new(config: FallbackConfig, rng: fastrand::Rng) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            next_index: 1,
        })
    }

    /// Reproducible generator.
    pub fn seeded(config: FallbackConfig, seed: u64) -> Result<Self, ValidationError> {
        Self::new(config, fastrand::Rng::with_seed(seed))
    }

    /// Generator seeded from entropy; batches differ between runs.
    pub fn unseeded(config: FallbackConfig) -> Result<Self, ValidationError> {
        Self::new(config, fastrand::Rng::new())
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Number the next record after `index`, never going backwards.
    ///
    /// Used when the batch already holds rows numbered `1..=index`.
    pub fn skip_past(&mut self, index: usize) {
        self.next_index = self.next_index.max(index.saturating_add(1));
    }

    /// Produce exactly `count` records stamped with `scraped_at`.
    pub fn generate(&mut self, count: usize, scraped_at: UtcDateTime) -> Vec<CanonicalRecord> {
        (0..count).map(|_| self.next_record(scraped_at)).collect()
    }

    fn next_record(&mut self, scraped_at: UtcDateTime) -> CanonicalRecord {
        let index = self.next_index;
        self.next_index += 1;

        let symbol = Symbol::sequential(&self.config.symbol_prefix, index);
        let sector = pick(&mut self.rng, &self.config.sectors);
        let country = pick(&mut self.rng, &self.config.countries);
        let market_cap = round_cents(self.config.market_cap.sample(&mut self.rng));
        let price = round_cents(self.config.price.sample(&mut self.rng));
        let volume = self
            .rng
            .u64(self.config.volume_min..=self.config.volume_max);
        let pe_ratio = (self.rng.f64() < self.config.pe_presence)
            .then(|| round_cents(self.config.pe_ratio.sample(&mut self.rng)));

        CanonicalRecord {
            company_name: format!("{} {index}", self.config.company_prefix),
            source_url: self
                .config
                .source_url_template
                .replace("{symbol}", symbol.as_str()),
            symbol,
            sector,
            country,
            price,
            market_cap,
            volume,
            pe_ratio,
            scraped_at,
        }
    }
}

fn pick(rng: &mut fastrand::Rng, vocabulary: &[String]) -> String {
    vocabulary[rng.usize(..vocabulary.len())].clone()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
