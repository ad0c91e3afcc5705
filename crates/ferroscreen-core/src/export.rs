//! CSV and JSON writers for canonical batches.
//!
//! Both formats use the canonical field order (see [`CANONICAL_FIELDS`]).
//! An absent P/E ratio is an empty CSV cell and `null` in JSON.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CanonicalRecord, CoreError, UtcDateTime, ValidationError, CANONICAL_FIELDS};

/// Supported export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ValidationError::InvalidExportFormat {
                value: other.to_owned(),
            }),
        }
    }
}

/// Write `records` as CSV with a canonical header row.
///
/// The header is written even for an empty batch.
pub fn write_csv<W: Write>(writer: W, records: &[CanonicalRecord]) -> Result<(), CoreError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CANONICAL_FIELDS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `records` as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, records: &[CanonicalRecord]) -> Result<(), CoreError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write `records` to `path` in `format`, replacing any existing file.
pub fn export_to_path(
    path: &Path,
    format: ExportFormat,
    records: &[CanonicalRecord],
) -> Result<(), CoreError> {
    let writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(writer, records)?,
        ExportFormat::Json => write_json(writer, records)?,
    }

    info!(path = %path.display(), %format, records = records.len(), "batch exported");
    Ok(())
}

/// `stocks_YYYYMMDD_HHMMSS.{csv,json}` for the given instant.
pub fn default_export_name(format: ExportFormat, now: UtcDateTime) -> String {
    format!("stocks_{}.{}", now.file_stamp(), format.extension())
}
