//! Core pipeline for ferroscreen.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Field parsing and record normalization
//! - Synthetic fallback generation
//! - Filtering and aggregation
//! - Record source contract, adapters and batch loading
//! - Caller-owned batch cache, export writers and configuration
//!
//! The parsing, normalization, filtering and aggregation stages are pure and
//! synchronous. Only sources and the cache are async.

pub mod adapters;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod fallback;
pub mod filter;
pub mod http_client;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod source;

pub use adapters::{JsonFileSource, NasdaqScreenerSource, StaticSource, SyntheticSource};
pub use aggregate::{
    aggregate, group_by_country, group_by_sector, summarize, top_by_market_cap, AggregateResult,
    CountryRollup, Highlights, SectorRollup, Summary,
};
pub use cache::{BatchCache, DEFAULT_CACHE_TTL};
pub use config::PipelineConfig;
pub use domain::{
    CanonicalRecord, RawRecord, RawValue, Symbol, SymbolPrefix, UtcDateTime, CANONICAL_FIELDS,
    UNKNOWN_LABEL,
};
pub use error::{AggregateError, CoreError, ValidationError};
pub use export::{default_export_name, export_to_path, write_csv, write_json, ExportFormat};
pub use fallback::{FallbackConfig, FallbackGenerator, UniformRange};
pub use filter::{market_cap_from_millions, FilterCriteria, PriceRange, Selection, ALL_LABEL};
pub use http_client::{
    CannedHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use normalize::{normalize_batch, normalize_record, Normalizer};
pub use parse::{
    parse_field, parse_market_cap, parse_pe_ratio, parse_price, parse_volume, FieldKind,
    FieldValue,
};
pub use pipeline::{load_batch, load_batch_cached, screen, LoadedBatch, Screening};
pub use source::{FetchFuture, RecordSource, SourceError, SourceErrorKind, SourceId};
