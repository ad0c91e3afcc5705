//! Behavior-driven tests for source failure and fallback generation
//!
//! These tests verify that an unavailable, empty or short source never
//! reduces the batch below the configured minimum, and that synthetic
//! records are well-formed and reproducible.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use ferroscreen_core::{
    load_batch, load_batch_cached, BatchCache, CannedHttpClient, FallbackConfig,
    FallbackGenerator, HttpError, HttpResponse, JsonFileSource, NasdaqScreenerSource,
    PipelineConfig, RawRecord, SourceError, SourceId, StaticSource, UtcDateTime,
};

fn seeded(seed: u64) -> FallbackGenerator {
    FallbackGenerator::seeded(FallbackConfig::default(), seed).expect("valid config")
}

// =============================================================================
// Fallback Generator
// =============================================================================

#[test]
fn when_seed_is_fixed_generation_is_reproducible() {
    // Given: Two generators with the same seed
    let as_of = UtcDateTime::now();

    // When: Each produces a batch
    let first = seeded(42).generate(25, as_of);
    let second = seeded(42).generate(25, as_of);

    // Then: The batches are identical
    assert_eq!(first, second);
}

#[test]
fn when_fifty_records_are_requested_symbols_are_unique() {
    let records = seeded(3).generate(50, UtcDateTime::now());

    let symbols: HashSet<&str> = records.iter().map(|record| record.symbol.as_str()).collect();
    assert_eq!(records.len(), 50);
    assert_eq!(symbols.len(), 50);
    assert_eq!(records[0].symbol.as_str(), "TICK001");
    assert_eq!(records[49].symbol.as_str(), "TICK050");
}

#[test]
fn when_records_are_generated_values_stay_within_configured_ranges() {
    // Given: The default vocabularies and ranges
    let config = FallbackConfig::default();

    // When: A large batch is generated
    let records = seeded(8).generate(500, UtcDateTime::now());

    // Then: Every value honours the configuration
    for record in &records {
        assert!(config.sectors.contains(&record.sector));
        assert!(config.countries.contains(&record.country));
        assert!((config.price.min..=config.price.max).contains(&record.price));
        assert!((config.market_cap.min..=config.market_cap.max).contains(&record.market_cap));
        assert!((config.volume_min..=config.volume_max).contains(&record.volume));
        assert_eq!((record.price * 100.0).round() / 100.0, record.price);
        if let Some(pe) = record.pe_ratio {
            assert!((config.pe_ratio.min..=config.pe_ratio.max).contains(&pe));
        }
    }

    // And: P/E is absent for some records and present for most
    let absent = records.iter().filter(|record| record.pe_ratio.is_none()).count();
    assert!(absent > 0, "expected some absent P/E ratios");
    assert!(absent < 150, "expected roughly 10% absent, got {absent}");
}

#[test]
fn when_pe_presence_is_zero_no_record_carries_a_ratio() {
    let config = FallbackConfig {
        pe_presence: 0.0,
        ..FallbackConfig::default()
    };

    let records = FallbackGenerator::seeded(config, 1)
        .expect("valid config")
        .generate(30, UtcDateTime::now());

    assert!(records.iter().all(|record| record.pe_ratio.is_none()));
}

#[test]
fn when_configuration_is_invalid_generator_is_refused() {
    let config = FallbackConfig {
        sectors: Vec::new(),
        ..FallbackConfig::default()
    };

    assert!(FallbackGenerator::seeded(config, 1).is_err());
}

// =============================================================================
// Batch Loading
// =============================================================================

#[tokio::test]
async fn when_source_fails_batch_is_fully_synthetic() {
    // Given: A source that is down
    let source = StaticSource::failing(SourceError::unavailable("connection refused"));
    let config = PipelineConfig::default().with_min_records(100);

    // When: A batch is loaded
    let batch = load_batch(&source, &mut seeded(1), &config).await;

    // Then: The minimum is met from the fallback generator
    assert_eq!(batch.records.len(), 100);
    assert_eq!(batch.synthesized, 100);
    assert_eq!(batch.source_chain, [SourceId::Synthetic]);
    assert!(batch.warnings[0].contains("connection refused"));
}

#[tokio::test]
async fn when_source_is_empty_it_is_treated_like_a_failure() {
    let config = PipelineConfig::default().with_min_records(12);

    let empty = load_batch(&StaticSource::empty(), &mut seeded(1), &config).await;
    let failed = load_batch(
        &StaticSource::failing(SourceError::internal("boom")),
        &mut seeded(1),
        &config,
    )
    .await;

    assert_eq!(empty.records.len(), failed.records.len());
    assert_eq!(empty.source_chain, failed.source_chain);
}

#[tokio::test]
async fn when_nasdaq_answers_with_rows_they_are_normalized_and_topped_up() {
    // Given: A screener transport returning two rows
    let body = r#"{"data":{"rows":[
        {"symbol":"AAPL","name":"Apple Inc.","lastsale":"$189.84","volume":"52,164,500",
         "marketCap":"2,950,000,000,000","country":"United States","sector":"Technology"},
        {"symbol":"XYZ","name":"Mystery Co","lastsale":"N/A","volume":"","marketCap":"",
         "country":"","sector":""}
    ]}}"#;
    let source = NasdaqScreenerSource::with_http_client(Arc::new(CannedHttpClient::respond(
        HttpResponse::ok_json(body),
    )));
    let config = PipelineConfig::default().with_min_records(5);

    // When: A batch is loaded
    let batch = load_batch(&source, &mut seeded(2), &config).await;

    // Then: Real rows come first, normalized, followed by synthetic top-up
    assert_eq!(batch.records.len(), 5);
    assert_eq!(batch.fetched, 2);
    assert_eq!(batch.synthesized, 3);
    assert_eq!(batch.source_chain, [SourceId::Nasdaq, SourceId::Synthetic]);

    let apple = &batch.records[0];
    assert_eq!(apple.price, 189.84);
    assert_eq!(apple.market_cap, 2_950_000_000_000.0);
    assert_eq!(apple.volume, 52_164_500);
    assert_eq!(
        apple.source_url,
        "https://www.nasdaq.com/market-activity/stocks/aapl"
    );

    let mystery = &batch.records[1];
    assert_eq!(mystery.price, 0.0);
    assert_eq!(mystery.sector, "Unknown");
    assert_eq!(mystery.country, "Unknown");
}

#[tokio::test]
async fn when_source_rows_lack_symbols_top_up_continues_numbering() {
    // Given: A short source whose rows carry no symbol
    let source = StaticSource::new(vec![
        RawRecord::new().with("company_name", "First Unnamed"),
        RawRecord::new().with("company_name", "Second Unnamed"),
    ]);
    let config = PipelineConfig::default().with_min_records(5);

    // When: The batch is topped up
    let batch = load_batch(&source, &mut seeded(4), &config).await;

    // Then: Every record in the batch has its own symbol
    let symbols: HashSet<&str> = batch
        .records
        .iter()
        .map(|record| record.symbol.as_str())
        .collect();
    assert_eq!(batch.records.len(), 5);
    assert_eq!(symbols.len(), 5);
}

#[tokio::test]
async fn when_nasdaq_transport_fails_batch_falls_back() {
    let source = NasdaqScreenerSource::with_http_client(Arc::new(CannedHttpClient::fail(
        HttpError::new("request timeout"),
    )));
    let config = PipelineConfig::default().with_min_records(7);

    let batch = load_batch(&source, &mut seeded(2), &config).await;

    assert_eq!(batch.records.len(), 7);
    assert!(batch.source_error.is_some());
}

#[tokio::test]
async fn when_file_source_is_used_rows_are_read_from_disk() {
    // Given: A raw JSON file with one row
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"[{{"symbol":"shop","company_name":"Shopify","sector":"Technology",
              "country":"Canada","price":"$70.15","market_cap":"90B",
              "volume":"3,400,000","pe_ratio":"0"}}]"#
    )
    .expect("write");
    let config = PipelineConfig::default().with_min_records(1);

    // When: A batch is loaded from the file
    let batch = load_batch(&JsonFileSource::new(file.path()), &mut seeded(2), &config).await;

    // Then: The row is normalized without any synthetic top-up
    assert_eq!(batch.records.len(), 1);
    let shop = &batch.records[0];
    assert_eq!(shop.symbol.as_str(), "SHOP");
    assert_eq!(shop.market_cap, 90_000_000_000.0);
    assert_eq!(shop.pe_ratio, None);
    assert_eq!(batch.source_chain, [SourceId::File]);
}

// =============================================================================
// Caller-Owned Cache
// =============================================================================

#[tokio::test]
async fn when_cache_is_warm_the_source_is_not_consulted() {
    // Given: A cache populated by a first load
    let cache = BatchCache::new(Duration::from_secs(60));
    let config = PipelineConfig::default().with_min_records(2);
    let warm = StaticSource::new(vec![
        RawRecord::new().with("symbol", "AAA"),
        RawRecord::new().with("symbol", "BBB"),
    ]);
    let first = load_batch_cached(&cache, &warm, &mut seeded(1), &config).await;

    // When: The same source id is loaded again, even though it now fails
    let failing = StaticSource::failing(SourceError::unavailable("down"));
    let second = load_batch_cached(&cache, &failing, &mut seeded(1), &config).await;

    // Then: The cached batch is returned
    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.records, second.records);
    assert!(second.warnings.is_empty());
}

#[tokio::test]
async fn when_source_recovers_after_a_failure_its_rows_are_fetched() {
    // Given: A cache and a source that failed on the first load
    let cache = BatchCache::new(Duration::from_secs(60));
    let config = PipelineConfig::default().with_min_records(3);
    let down = StaticSource::failing(SourceError::unavailable("connection refused"));
    let fallback = load_batch_cached(&cache, &down, &mut seeded(1), &config).await;

    // When: The same source id answers on the next load
    let healthy = StaticSource::new(vec![
        RawRecord::new().with("symbol", "AAPL"),
        RawRecord::new().with("symbol", "MSFT"),
        RawRecord::new().with("symbol", "IBM"),
    ]);
    let recovered = load_batch_cached(&cache, &healthy, &mut seeded(1), &config).await;

    // Then: The fallback batch was not served from the cache
    assert!(fallback.source_error.is_some());
    assert!(!recovered.cache_hit);
    let symbols: Vec<&str> = recovered
        .records
        .iter()
        .map(|record| record.symbol.as_str())
        .collect();
    assert_eq!(symbols, ["AAPL", "MSFT", "IBM"]);
}

#[tokio::test]
async fn when_cache_is_disabled_every_load_hits_the_source() {
    let cache = BatchCache::disabled();
    let config = PipelineConfig::default().with_min_records(2);
    let source = StaticSource::empty();

    let first = load_batch_cached(&cache, &source, &mut seeded(1), &config).await;
    let second = load_batch_cached(&cache, &source, &mut seeded(1), &config).await;

    assert!(!first.cache_hit);
    assert!(!second.cache_hit);
    assert_eq!(cache.len().await, 0);
}
