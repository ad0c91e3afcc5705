use ferroscreen_core::{screen, AggregateResult, CountryRollup};
use serde::Serialize;

use crate::cli::SummaryArgs;
use crate::error::CliError;

use super::{CommandResult, Context, NO_MATCHES_WARNING};

#[derive(Debug, Serialize)]
struct SummaryResponseData {
    batch_size: usize,
    matched: usize,
    aggregate: Option<AggregateResult>,
    top_countries: Vec<CountryRollup>,
}

pub async fn run(args: &SummaryArgs, context: &mut Context) -> Result<CommandResult, CliError> {
    let criteria = args.filters.to_criteria()?;
    let batch = context.load().await;

    let screening = screen(&batch.records, &criteria);
    let matched = screening.matched.len();
    let top_countries = screening
        .result
        .as_ref()
        .map(|result| result.top_countries(args.top_countries).to_vec())
        .unwrap_or_default();

    let data = SummaryResponseData {
        batch_size: batch.records.len(),
        matched,
        aggregate: screening.result,
        top_countries,
    };

    let result = CommandResult::from_batch(serde_json::to_value(data)?, &batch);
    if matched == 0 {
        return Ok(result.with_warning(NO_MATCHES_WARNING));
    }
    Ok(result)
}
