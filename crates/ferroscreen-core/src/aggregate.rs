//! Grouped rollups and summary metrics over a filtered batch.
//!
//! [`aggregate`] refuses an empty batch with [`AggregateError::EmptyBatch`]
//! because the mean price is undefined; callers check the filter output first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AggregateError, CanonicalRecord, Symbol};

/// Market cap total and record count for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRollup {
    pub sector: String,
    pub market_cap: f64,
    pub count: usize,
}

/// Market cap total for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRollup {
    pub country: String,
    pub market_cap: f64,
}

/// Scalar metrics over the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean_price: f64,
    pub total_market_cap: f64,
    pub total_volume: u64,
}

/// Headline facts for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    /// Sector with the most records; ties go to the first encountered.
    pub largest_sector: String,
    /// Symbol with the highest market cap; ties go to the first encountered.
    pub top_symbol: Symbol,
}

/// Everything derived from one filtered batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub summary: Summary,
    /// First-encountered sector order.
    pub by_sector: Vec<SectorRollup>,
    /// Descending by market cap; equal sums keep input order.
    pub by_country: Vec<CountryRollup>,
    pub highlights: Highlights,
}

impl AggregateResult {
    /// The `n` countries with the largest market cap.
    pub fn top_countries(&self, n: usize) -> &[CountryRollup] {
        &self.by_country[..n.min(self.by_country.len())]
    }
}

/// Compute every rollup for `records`.
pub fn aggregate(records: &[CanonicalRecord]) -> Result<AggregateResult, AggregateError> {
    let summary = summarize(records)?;
    let by_sector = group_by_sector(records);
    let highlights = highlights(records, &by_sector)?;

    Ok(AggregateResult {
        summary,
        by_sector,
        by_country: group_by_country(records),
        highlights,
    })
}

/// Count, mean price, total market cap and total volume.
pub fn summarize(records: &[CanonicalRecord]) -> Result<Summary, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::EmptyBatch);
    }

    let count = records.len();
    let price_sum: f64 = records.iter().map(|record| record.price).sum();

    Ok(Summary {
        count,
        mean_price: price_sum / count as f64,
        total_market_cap: records.iter().map(|record| record.market_cap).sum(),
        total_volume: records
            .iter()
            .fold(0_u64, |total, record| total.saturating_add(record.volume)),
    })
}

/// Market cap sum and count per sector, in first-encountered order.
pub fn group_by_sector(records: &[CanonicalRecord]) -> Vec<SectorRollup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<SectorRollup> = Vec::new();

    for record in records {
        let position = *positions.entry(record.sector.as_str()).or_insert_with(|| {
            rollups.push(SectorRollup {
                sector: record.sector.clone(),
                market_cap: 0.0,
                count: 0,
            });
            rollups.len() - 1
        });

        let rollup = &mut rollups[position];
        rollup.market_cap += record.market_cap;
        rollup.count += 1;
    }

    rollups
}

/// Market cap sum per country, largest first. The sort is stable, so equal
/// sums stay in first-encountered order.
pub fn group_by_country(records: &[CanonicalRecord]) -> Vec<CountryRollup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut rollups: Vec<CountryRollup> = Vec::new();

    for record in records {
        let position = *positions.entry(record.country.as_str()).or_insert_with(|| {
            rollups.push(CountryRollup {
                country: record.country.clone(),
                market_cap: 0.0,
            });
            rollups.len() - 1
        });

        rollups[position].market_cap += record.market_cap;
    }

    rollups.sort_by(|left, right| right.market_cap.total_cmp(&left.market_cap));
    rollups
}

/// The `n` records with the largest market cap; equal caps keep input order.
pub fn top_by_market_cap(records: &[CanonicalRecord], n: usize) -> Vec<CanonicalRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|left, right| right.market_cap.total_cmp(&left.market_cap));
    ranked.truncate(n);
    ranked
}

fn highlights(
    records: &[CanonicalRecord],
    by_sector: &[SectorRollup],
) -> Result<Highlights, AggregateError> {
    let largest_sector = by_sector
        .iter()
        .reduce(|best, candidate| if candidate.count > best.count { candidate } else { best })
        .ok_or(AggregateError::EmptyBatch)?;

    let top_record = records
        .iter()
        .reduce(|best, candidate| {
            if candidate.market_cap > best.market_cap {
                candidate
            } else {
                best
            }
        })
        .ok_or(AggregateError::EmptyBatch)?;

    Ok(Highlights {
        largest_sector: largest_sector.sector.clone(),
        top_symbol: top_record.symbol.clone(),
    })
}
