use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;
use crate::envelope::Envelope;
use crate::error::CliError;

const RECORD_COLUMNS: [(&str, usize); 7] = [
    ("symbol", 10),
    ("sector", 14),
    ("country", 16),
    ("price", 10),
    ("market_cap", 18),
    ("volume", 12),
    ("pe_ratio", 8),
];

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut out, envelope)?;
            } else {
                serde_json::to_writer(&mut out, envelope)?;
            }
            writeln!(out)?;
        }
        OutputFormat::Ndjson => write_ndjson(&mut out, envelope)?,
        OutputFormat::Table => write_table(&mut out, envelope)?,
    }

    Ok(())
}

/// One line for the metadata, one per record when the payload lists
/// records, and one for the remaining payload otherwise.
fn write_ndjson<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, &serde_json::json!({ "meta": envelope.meta }))?;
    writeln!(out)?;

    match envelope.data.get("records").and_then(Value::as_array) {
        Some(records) => {
            for record in records {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
        None => {
            serde_json::to_writer(&mut *out, &envelope.data)?;
            writeln!(out)?;
        }
    }

    for error in &envelope.errors {
        serde_json::to_writer(&mut *out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
    }

    Ok(())
}

fn write_table<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(
        out,
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|source| source.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
    writeln!(out, "cache_hit   : {}", envelope.meta.cache_hit)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    match envelope.data.get("records").and_then(Value::as_array) {
        Some(records) => {
            if let Some(summary) = envelope.data.get("summary").filter(|s| !s.is_null()) {
                writeln!(out, "summary     : {summary}")?;
            }
            write_record_table(out, records)?;
        }
        None => {
            writeln!(out, "data:")?;
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

fn write_record_table<W: Write>(out: &mut W, records: &[Value]) -> Result<(), CliError> {
    let header = RECORD_COLUMNS
        .iter()
        .map(|&(name, width)| format!("{name:<width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{}", header.trim_end())?;

    for record in records {
        let row = RECORD_COLUMNS
            .iter()
            .map(|&(name, width)| format!("{:<width$}", cell(record.get(name))))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{}", row.trim_end())?;
    }

    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::from("-"),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => match number.as_f64() {
            Some(float) if number.is_f64() => format!("{float:.2}"),
            _ => number.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
