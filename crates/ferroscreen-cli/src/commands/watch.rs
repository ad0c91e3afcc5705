//! Re-run the summary on a fixed interval.
//!
//! Rounds share one [`BatchCache`], so only the first round (and any round
//! after the TTL lapses) touches the source.

use std::time::Duration;

use ferroscreen_core::{screen, BatchCache, Summary};
use serde::Serialize;
use tracing::info;

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::{CommandResult, Context, NO_MATCHES_WARNING};

#[derive(Debug, Serialize)]
struct WatchRound {
    round: usize,
    cache_hit: bool,
    batch_size: usize,
    matched: usize,
    largest_sector: Option<String>,
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct WatchResponseData {
    interval_secs: u64,
    rounds: Vec<WatchRound>,
}

pub async fn run(args: &WatchArgs, context: &mut Context) -> Result<CommandResult, CliError> {
    let criteria = args.filters.to_criteria()?;
    let cache = BatchCache::new(context.config.cache_ttl);

    let mut rounds = Vec::with_capacity(args.iterations);
    let mut first_batch = None;

    for round in 1..=args.iterations {
        if round > 1 {
            tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
        }

        let batch = context.load_cached(&cache).await;
        let screening = screen(&batch.records, &criteria);
        info!(round, cache_hit = batch.cache_hit, matched = screening.matched.len(), "watch round");

        rounds.push(WatchRound {
            round,
            cache_hit: batch.cache_hit,
            batch_size: batch.records.len(),
            matched: screening.matched.len(),
            largest_sector: screening
                .result
                .as_ref()
                .map(|result| result.highlights.largest_sector.clone()),
            summary: screening.result.as_ref().map(|result| result.summary),
        });

        if first_batch.is_none() {
            first_batch = Some(batch);
        }
    }

    let any_empty = rounds.iter().any(|round| round.matched == 0);
    let any_hit = rounds.iter().any(|round| round.cache_hit);
    let data = serde_json::to_value(WatchResponseData {
        interval_secs: args.interval_secs,
        rounds,
    })?;

    let mut result = match &first_batch {
        Some(batch) => CommandResult::from_batch(data, batch),
        None => CommandResult::ok(data, vec![context.source.id()]),
    };
    result.cache_hit = any_hit;

    if any_empty {
        result = result.with_warning(NO_MATCHES_WARNING);
    }
    Ok(result)
}
