//! Pipeline configuration with environment overrides.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::{FallbackConfig, FallbackGenerator, ValidationError};

pub const ENV_MIN_RECORDS: &str = "FERROSCREEN_MIN_RECORDS";
pub const ENV_CACHE_TTL_SECS: &str = "FERROSCREEN_CACHE_TTL_SECS";
pub const ENV_SEED: &str = "FERROSCREEN_SEED";
pub const ENV_PE_PRESENCE: &str = "FERROSCREEN_PE_PRESENCE";

/// Settings shared by batch loading and fallback generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Batches smaller than this are topped up with synthetic records.
    pub min_records: usize,
    pub cache_ttl: Duration,
    /// Fixed seed for reproducible synthetic data; `None` uses entropy.
    pub seed: Option<u64>,
    pub fallback: FallbackConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_records: 100,
            cache_ttl: DEFAULT_CACHE_TTL,
            seed: None,
            fallback: FallbackConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `FERROSCREEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`. Malformed values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(min_records) = read::<usize>(&lookup, ENV_MIN_RECORDS) {
            config.min_records = min_records;
        }
        if let Some(secs) = read::<u64>(&lookup, ENV_CACHE_TTL_SECS) {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(seed) = read::<u64>(&lookup, ENV_SEED) {
            config.seed = Some(seed);
        }
        if let Some(presence) = read::<f64>(&lookup, ENV_PE_PRESENCE) {
            if (0.0..=1.0).contains(&presence) {
                config.fallback.pe_presence = presence;
            } else {
                warn!(
                    name = ENV_PE_PRESENCE,
                    value = presence,
                    "probability outside [0, 1] ignored"
                );
            }
        }

        config
    }

    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Build the fallback generator this configuration describes.
    pub fn generator(&self) -> Result<FallbackGenerator, ValidationError> {
        match self.seed {
            Some(seed) => FallbackGenerator::seeded(self.fallback.clone(), seed),
            None => FallbackGenerator::unseeded(self.fallback.clone()),
        }
    }
}

fn read<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, value = trimmed, "malformed environment override ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_records, 100);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.seed, None);
        assert_eq!(config.fallback.pe_presence, 0.9);
    }

    #[test]
    fn overrides_are_applied() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            (ENV_MIN_RECORDS, "25"),
            (ENV_CACHE_TTL_SECS, "5"),
            (ENV_SEED, "42"),
            (ENV_PE_PRESENCE, "0.5"),
        ]));

        assert_eq!(config.min_records, 25);
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.fallback.pe_presence, 0.5);
    }

    #[test]
    fn malformed_overrides_fall_back_to_defaults() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            (ENV_MIN_RECORDS, "lots"),
            (ENV_SEED, ""),
            (ENV_PE_PRESENCE, "1.5"),
        ]));

        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn seeded_configs_build_identical_generators() {
        let config = PipelineConfig::default().with_seed(Some(3));
        let as_of = crate::UtcDateTime::now();

        let first = config.generator().expect("valid").generate(4, as_of);
        let second = config.generator().expect("valid").generate(4, as_of);
        assert_eq!(first, second);
    }
}
