//! Write the filtered batch to CSV or JSON.

use std::path::PathBuf;

use ferroscreen_core::{default_export_name, export_to_path, top_by_market_cap, UtcDateTime};
use serde_json::json;

use crate::cli::ExportArgs;
use crate::error::CliError;

use super::{CommandResult, Context, NO_MATCHES_WARNING};

pub async fn run(args: &ExportArgs, context: &mut Context) -> Result<CommandResult, CliError> {
    let criteria = args.filters.to_criteria()?;
    let batch = context.load().await;

    let matched = criteria.apply(&batch.records);
    if matched.is_empty() {
        let data = json!({
            "format": args.export_format,
            "rows_exported": 0,
            "exported": false
        });
        return Ok(CommandResult::from_batch(data, &batch).with_warning(NO_MATCHES_WARNING));
    }

    let rows = top_by_market_cap(&matched, args.top.unwrap_or(matched.len()));
    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(default_export_name(args.export_format, UtcDateTime::now()))
    });

    export_to_path(&output, args.export_format, &rows)?;

    let data = json!({
        "format": args.export_format,
        "output": output.display().to_string(),
        "rows_exported": rows.len(),
        "exported": true
    });
    Ok(CommandResult::from_batch(data, &batch))
}
