//! Source contract for raw stock rows.
//!
//! A [`RecordSource`] is a black box that returns zero or more
//! [`RawRecord`]s or fails. Both an empty success and a failure trigger
//! fallback generation in [`crate::pipeline::load_batch`]; retry and backoff
//! belong to the source itself.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{RawRecord, ValidationError};

/// Identifiers recorded in batch provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Nasdaq,
    File,
    Static,
    Synthetic,
}

impl SourceId {
    pub const ALL: [Self; 4] = [Self::Nasdaq, Self::File, Self::Static, Self::Synthetic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nasdaq => "nasdaq",
            Self::File => "file",
            Self::Static => "static",
            Self::Synthetic => "synthetic",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nasdaq" => Ok(Self::Nasdaq),
            "file" => Ok(Self::File),
            "static" => Ok(Self::Static),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidResponse,
    Internal,
}

/// Structured source failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + 'a>>;

/// Contract implemented by every raw-row provider.
///
/// Implementations must be safe to call repeatedly; any connection reuse is
/// their own concern.
pub trait RecordSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn fetch(&self) -> FetchFuture<'_>;
}
