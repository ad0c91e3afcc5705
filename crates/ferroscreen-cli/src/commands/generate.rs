//! Write a synthetic raw batch to disk.
//!
//! The JSON file is readable by `--source file`, so a generated batch can be
//! replayed through the whole pipeline offline.

use ferroscreen_core::{export_to_path, CanonicalRecord, ExportFormat, SourceId, UtcDateTime};
use serde::Serialize;

use crate::cli::GenerateArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

const RAW_DATA_STEM: &str = "raw_data";

#[derive(Debug, Serialize)]
struct GenerateResponseData {
    count: usize,
    files: Vec<String>,
    price: Option<Span>,
    market_cap: Option<Span>,
    with_pe_ratio: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Span {
    min: f64,
    max: f64,
}

pub fn run(args: &GenerateArgs, context: &mut Context) -> Result<CommandResult, CliError> {
    let records = context.generator.generate(args.count, UtcDateTime::now());

    std::fs::create_dir_all(&args.output_dir)?;

    let mut files = Vec::new();
    for format in dedup_formats(&args.formats) {
        let path = args
            .output_dir
            .join(format!("{RAW_DATA_STEM}.{}", format.extension()));
        export_to_path(&path, format, &records)?;
        files.push(path.display().to_string());
    }

    let data = GenerateResponseData {
        count: records.len(),
        files,
        price: span(&records, |record| record.price),
        market_cap: span(&records, |record| record.market_cap),
        with_pe_ratio: records
            .iter()
            .filter(|record| record.pe_ratio.is_some())
            .count(),
    };

    Ok(CommandResult::ok(
        serde_json::to_value(data)?,
        vec![SourceId::Synthetic],
    ))
}

fn dedup_formats(formats: &[ExportFormat]) -> Vec<ExportFormat> {
    let mut unique = Vec::with_capacity(formats.len());
    for format in formats {
        if !unique.contains(format) {
            unique.push(*format);
        }
    }
    unique
}

fn span(records: &[CanonicalRecord], field: impl Fn(&CanonicalRecord) -> f64) -> Option<Span> {
    records.iter().map(field).fold(None, |acc, value| {
        Some(match acc {
            None => Span {
                min: value,
                max: value,
            },
            Some(Span { min, max }) => Span {
                min: min.min(value),
                max: max.max(value),
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use ferroscreen_core::{FallbackConfig, FallbackGenerator, PipelineConfig, SyntheticSource};

    use super::*;

    fn context(seed: u64) -> Context {
        Context {
            config: PipelineConfig::default(),
            source: Box::new(SyntheticSource),
            generator: FallbackGenerator::seeded(FallbackConfig::default(), seed)
                .expect("valid config"),
        }
    }

    #[test]
    fn writes_raw_data_files_into_output_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let args = GenerateArgs {
            count: 12,
            output_dir: dir.path().join("nested"),
            formats: vec![ExportFormat::Csv, ExportFormat::Json],
        };

        let result = run(&args, &mut context(5)).expect("generate");

        assert_eq!(result.data["count"], 12);
        assert_eq!(result.source_chain, [SourceId::Synthetic]);
        assert!(dir.path().join("nested/raw_data.csv").is_file());
        let json = std::fs::read_to_string(dir.path().join("nested/raw_data.json"))
            .expect("json written");
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).expect("json array");
        assert_eq!(rows.len(), 12);
        assert!(result.data["price"]["min"].as_f64() <= result.data["price"]["max"].as_f64());
    }

    #[test]
    fn duplicate_formats_are_written_once() {
        let formats = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Json];
        assert_eq!(
            dedup_formats(&formats),
            [ExportFormat::Json, ExportFormat::Csv]
        );
    }

    #[test]
    fn span_of_empty_batch_is_none() {
        assert_eq!(span(&[], |record| record.price), None);
    }
}
