use ferroscreen_core::{screen, top_by_market_cap, CanonicalRecord, Summary};
use serde::Serialize;

use crate::cli::ScreenArgs;
use crate::error::CliError;

use super::{CommandResult, Context, NO_MATCHES_WARNING};

#[derive(Debug, Serialize)]
struct ScreenResponseData {
    batch_size: usize,
    matched: usize,
    summary: Option<Summary>,
    records: Vec<CanonicalRecord>,
}

pub async fn run(args: &ScreenArgs, context: &mut Context) -> Result<CommandResult, CliError> {
    let criteria = args.filters.to_criteria()?;
    let batch = context.load().await;

    let screening = screen(&batch.records, &criteria);
    let data = ScreenResponseData {
        batch_size: batch.records.len(),
        matched: screening.matched.len(),
        summary: screening.result.as_ref().map(|result| result.summary),
        records: top_by_market_cap(&screening.matched, args.limit),
    };

    let result = CommandResult::from_batch(serde_json::to_value(data)?, &batch);
    if screening.is_empty() {
        return Ok(result.with_warning(NO_MATCHES_WARNING));
    }
    Ok(result)
}
