use thiserror::Error;

use crate::source::SourceError;

/// Validation and contract errors exposed by `ferroscreen-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("price range lower bound {lower} exceeds upper bound {upper}")]
    InvalidPriceRange { lower: f64, upper: f64 },
    #[error("range '{field}' has min {min} greater than max {max}")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("probability '{field}' must be within [0, 1]: {value}")]
    InvalidProbability { field: &'static str, value: f64 },
    #[error("vocabulary '{field}' must contain at least one entry")]
    EmptyVocabulary { field: &'static str },

    #[error("invalid source '{value}', expected one of nasdaq, file, static, synthetic")]
    InvalidSource { value: String },
    #[error("invalid export format '{value}', expected csv or json")]
    InvalidExportFormat { value: String },
}

/// Raised when a caller aggregates a batch that has no records.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot aggregate an empty batch: mean price is undefined")]
    EmptyBatch,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
