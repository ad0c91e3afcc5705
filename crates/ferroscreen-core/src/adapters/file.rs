use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::source::{FetchFuture, RecordSource, SourceError, SourceId};
use crate::RawRecord;

/// Reads a JSON array of raw row objects from disk.
///
/// This is the `raw_data.json` layout written by `ferroscreen generate` and
/// by scrapers that dump screener rows before normalization.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn id(&self) -> SourceId {
        SourceId::File
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async move {
            let body = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|error| match error.kind() {
                    ErrorKind::NotFound => SourceError::unavailable(format!(
                        "input file '{}' does not exist",
                        self.path.display()
                    )),
                    _ => SourceError::internal(format!(
                        "failed to read '{}': {error}",
                        self.path.display()
                    )),
                })?;

            let records: Vec<RawRecord> = serde_json::from_str(&body).map_err(|error| {
                SourceError::invalid_response(format!(
                    "'{}' is not a JSON array of objects: {error}",
                    self.path.display()
                ))
            })?;

            info!(path = %self.path.display(), rows = records.len(), "raw rows loaded from file");
            Ok(records)
        })
    }
}
