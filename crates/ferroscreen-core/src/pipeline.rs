//! Batch loading and the normalize → filter → aggregate run.
//!
//! [`load_batch`] never fails: an unavailable source, an empty answer or a
//! short answer are all resolved by the [`FallbackGenerator`], so the
//! returned batch holds at least [`PipelineConfig::min_records`] records.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregateResult};
use crate::cache::BatchCache;
use crate::config::PipelineConfig;
use crate::normalize::Normalizer;
use crate::source::{RecordSource, SourceError, SourceId};
use crate::{CanonicalRecord, FallbackGenerator, FilterCriteria, UtcDateTime};

/// A normalized batch and how it was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedBatch {
    pub records: Vec<CanonicalRecord>,
    /// Sources that contributed records, in order.
    pub source_chain: Vec<SourceId>,
    /// Rows that came from the source.
    pub fetched: usize,
    /// Records produced by the fallback generator.
    pub synthesized: usize,
    pub warnings: Vec<String>,
    /// Failure reported by the source, already resolved by fallback.
    #[serde(skip)]
    pub source_error: Option<SourceError>,
    pub cache_hit: bool,
}

impl LoadedBatch {
    pub fn is_synthetic_only(&self) -> bool {
        self.fetched == 0
    }

    /// True when `source` failed or came back empty and the batch is
    /// generator output standing in for it.
    pub fn is_fallback_for(&self, source: SourceId) -> bool {
        self.source_error.is_some() || (self.fetched == 0 && source != SourceId::Synthetic)
    }
}

/// Fetch, normalize and top up to `config.min_records`.
pub async fn load_batch(
    source: &dyn RecordSource,
    generator: &mut FallbackGenerator,
    config: &PipelineConfig,
) -> LoadedBatch {
    let now = UtcDateTime::now();
    let mut warnings = Vec::new();
    let mut source_error = None;

    let raws = match source.fetch().await {
        Ok(raws) if raws.is_empty() => {
            if source.id() != SourceId::Synthetic {
                warn!(source = %source.id(), "source returned no rows; generating fallback batch");
                warnings.push(format!("{} returned no rows", source.id()));
            }
            Vec::new()
        }
        Ok(raws) => raws,
        Err(error) => {
            warn!(source = %source.id(), %error, "source failed; generating fallback batch");
            warnings.push(format!("{} unavailable: {error}", source.id()));
            source_error = Some(error);
            Vec::new()
        }
    };

    let fetched = raws.len();
    let mut records = Normalizer::new(now)
        .with_symbol_prefix(generator.config().symbol_prefix.clone())
        .normalize_batch(&raws);

    let mut source_chain = Vec::new();
    if fetched > 0 {
        source_chain.push(source.id());
    }

    let shortfall = config.min_records.saturating_sub(fetched);
    if shortfall > 0 {
        if fetched > 0 {
            warn!(
                fetched,
                min_records = config.min_records,
                "short batch topped up with synthetic records"
            );
            warnings.push(format!(
                "{} returned {fetched} rows; topped up with {shortfall} synthetic records",
                source.id()
            ));
        }
        generator.skip_past(fetched);
        records.extend(generator.generate(shortfall, now));
        source_chain.push(SourceId::Synthetic);
    }

    info!(
        fetched,
        synthesized = shortfall,
        total = records.len(),
        "batch loaded"
    );

    LoadedBatch {
        records,
        source_chain,
        fetched,
        synthesized: shortfall,
        warnings,
        source_error,
        cache_hit: false,
    }
}

/// [`load_batch`] behind a caller-owned cache keyed by source id.
///
/// A hit returns the cached records without touching the source. Batches
/// standing in for a failed or empty source are never stored, so the next
/// call tries the source again.
pub async fn load_batch_cached(
    cache: &BatchCache,
    source: &dyn RecordSource,
    generator: &mut FallbackGenerator,
    config: &PipelineConfig,
) -> LoadedBatch {
    let key = source.id().as_str();

    if let Some(records) = cache.get(key).await {
        info!(source = key, records = records.len(), "batch served from cache");
        return LoadedBatch {
            records: records.as_ref().clone(),
            source_chain: vec![source.id()],
            fetched: 0,
            synthesized: 0,
            warnings: Vec::new(),
            source_error: None,
            cache_hit: true,
        };
    }

    let batch = load_batch(source, generator, config).await;
    if batch.is_fallback_for(source.id()) {
        info!(source = key, "fallback batch not cached");
        return batch;
    }

    let ttl = (config.cache_ttl != Duration::ZERO).then_some(config.cache_ttl);
    cache.put(key, batch.records.clone(), ttl).await;
    batch
}

/// Filtered records plus their rollups; `result` is `None` when nothing
/// matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub matched: Vec<CanonicalRecord>,
    pub result: Option<AggregateResult>,
}

impl Screening {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Filter `records` and aggregate whatever matched.
pub fn screen(records: &[CanonicalRecord], criteria: &FilterCriteria) -> Screening {
    let matched = criteria.apply(records);
    let result = aggregate(&matched).ok();

    Screening { matched, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{StaticSource, SyntheticSource};
    use crate::{FallbackConfig, RawRecord};

    fn generator() -> FallbackGenerator {
        FallbackGenerator::seeded(FallbackConfig::default(), 11).expect("valid config")
    }

    fn config(min_records: usize) -> PipelineConfig {
        PipelineConfig::default().with_min_records(min_records)
    }

    #[tokio::test]
    async fn failure_generates_min_records() {
        let source = StaticSource::failing(SourceError::unavailable("offline"));

        let batch = load_batch(&source, &mut generator(), &config(10)).await;

        assert_eq!(batch.records.len(), 10);
        assert_eq!(batch.fetched, 0);
        assert_eq!(batch.synthesized, 10);
        assert_eq!(batch.source_chain, [SourceId::Synthetic]);
        assert_eq!(batch.warnings.len(), 1);
        assert_eq!(batch.source_error, Some(SourceError::unavailable("offline")));
        assert!(batch.is_synthetic_only());
    }

    #[tokio::test]
    async fn empty_success_is_treated_like_failure() {
        let batch = load_batch(&StaticSource::empty(), &mut generator(), &config(4)).await;

        assert_eq!(batch.records.len(), 4);
        assert_eq!(batch.source_chain, [SourceId::Synthetic]);
    }

    #[tokio::test]
    async fn synthetic_source_is_silent() {
        let batch = load_batch(&SyntheticSource, &mut generator(), &config(3)).await;

        assert_eq!(batch.records.len(), 3);
        assert!(batch.warnings.is_empty());
        assert_eq!(batch.source_chain, [SourceId::Synthetic]);
    }

    #[tokio::test]
    async fn short_batch_is_topped_up() {
        let source = StaticSource::new(vec![
            RawRecord::new().with("symbol", "AAPL").with("market_cap", "$3T"),
            RawRecord::new().with("symbol", "MSFT").with("market_cap", "2.9T"),
        ]);

        let batch = load_batch(&source, &mut generator(), &config(5)).await;

        assert_eq!(batch.records.len(), 5);
        assert_eq!(batch.fetched, 2);
        assert_eq!(batch.synthesized, 3);
        assert_eq!(batch.records[0].symbol.as_str(), "AAPL");
        assert_eq!(batch.records[0].market_cap, 3e12);
        assert_eq!(batch.source_chain, [SourceId::Static, SourceId::Synthetic]);
    }

    #[tokio::test]
    async fn sufficient_batch_is_untouched() {
        let source = StaticSource::new(vec![RawRecord::new().with("symbol", "AAPL")]);

        let batch = load_batch(&source, &mut generator(), &config(1)).await;

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.synthesized, 0);
        assert!(batch.warnings.is_empty());
        assert_eq!(batch.source_chain, [SourceId::Static]);
    }

    #[tokio::test]
    async fn cached_load_skips_source_on_hit() {
        let cache = BatchCache::default();
        let source = StaticSource::new(vec![
            RawRecord::new().with("symbol", "AAPL"),
            RawRecord::new().with("symbol", "MSFT"),
        ]);

        let first = load_batch_cached(&cache, &source, &mut generator(), &config(3)).await;
        let second = load_batch_cached(&cache, &source, &mut generator(), &config(3)).await;

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.records, second.records);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached_and_recovery_is_fetched() {
        let cache = BatchCache::default();
        let down = StaticSource::failing(SourceError::unavailable("offline"));
        let recovered = StaticSource::new(vec![
            RawRecord::new().with("symbol", "AAPL"),
            RawRecord::new().with("symbol", "MSFT"),
            RawRecord::new().with("symbol", "IBM"),
        ]);

        let failed = load_batch_cached(&cache, &down, &mut generator(), &config(3)).await;
        let healthy = load_batch_cached(&cache, &recovered, &mut generator(), &config(3)).await;

        assert!(failed.is_fallback_for(SourceId::Static));
        assert!(!healthy.cache_hit);
        assert_eq!(healthy.fetched, 3);
        assert_eq!(healthy.records[0].symbol.as_str(), "AAPL");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn synthetic_source_batches_are_cached() {
        let cache = BatchCache::default();

        load_batch_cached(&cache, &SyntheticSource, &mut generator(), &config(2)).await;
        let second =
            load_batch_cached(&cache, &SyntheticSource, &mut generator(), &config(2)).await;

        assert!(second.cache_hit);
    }

    #[tokio::test]
    async fn unnamed_rows_and_top_up_never_share_symbols() {
        let source = StaticSource::new(vec![
            RawRecord::new().with("company_name", "Nameless One"),
            RawRecord::new().with("company_name", "Nameless Two"),
        ]);

        let batch = load_batch(&source, &mut generator(), &config(5)).await;

        let symbols: Vec<&str> = batch.records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, ["TICK001", "TICK002", "TICK003", "TICK004", "TICK005"]);
    }

    #[test]
    fn screen_reports_empty_match_structurally() {
        let records = generator().generate(5, UtcDateTime::now());
        let criteria = FilterCriteria::new().with_country(Some("Atlantis"));

        let screening = screen(&records, &criteria);

        assert!(screening.is_empty());
        assert!(screening.result.is_none());
    }
}
