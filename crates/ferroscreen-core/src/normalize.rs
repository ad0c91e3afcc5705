//! Raw source rows into canonical records.

use tracing::{debug, warn};

use crate::parse::{parse_market_cap, parse_pe_ratio, parse_price, parse_volume};
use crate::{CanonicalRecord, RawRecord, RawValue, Symbol, SymbolPrefix, UtcDateTime, UNKNOWN_LABEL};

/// Converts [`RawRecord`]s into [`CanonicalRecord`]s.
///
/// Holds the timestamp stamped onto rows that arrive without one, and the
/// prefix used when a row has no usable symbol. Nothing else is carried
/// between calls.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stamped_at: UtcDateTime,
    symbol_prefix: SymbolPrefix,
}

impl Normalizer {
    pub fn new(stamped_at: UtcDateTime) -> Self {
        Self {
            stamped_at,
            symbol_prefix: SymbolPrefix::default(),
        }
    }

    pub fn with_symbol_prefix(mut self, symbol_prefix: SymbolPrefix) -> Self {
        self.symbol_prefix = symbol_prefix;
        self
    }

    pub const fn stamped_at(&self) -> UtcDateTime {
        self.stamped_at
    }

    /// Normalize one row. `index` (1-based) names the row when its symbol is
    /// missing or invalid.
    pub fn normalize(&self, raw: &RawRecord, index: usize) -> CanonicalRecord {
        CanonicalRecord {
            symbol: self.symbol(raw.get("symbol"), index),
            company_name: verbatim(raw.get("company_name")),
            sector: label_or_unknown(raw.get("sector")),
            country: label_or_unknown(raw.get("country")),
            price: parse_price(raw.get("price")),
            market_cap: parse_market_cap(raw.get("market_cap")),
            volume: parse_volume(raw.get("volume")),
            pe_ratio: parse_pe_ratio(raw.get("pe_ratio")),
            source_url: verbatim(raw.get("source_url")),
            scraped_at: self.scraped_at(raw.get("scraped_at")),
        }
    }

    /// Normalize a batch in order; row indices start at 1.
    pub fn normalize_batch(&self, raws: &[RawRecord]) -> Vec<CanonicalRecord> {
        raws.iter()
            .enumerate()
            .map(|(position, raw)| self.normalize(raw, position + 1))
            .collect()
    }

    fn symbol(&self, raw: &RawValue, index: usize) -> Symbol {
        match raw.non_blank_text().map(|text| Symbol::parse(&text)) {
            Some(Ok(symbol)) => symbol,
            Some(Err(error)) => {
                let synthesized = Symbol::sequential(&self.symbol_prefix, index);
                warn!(%error, %synthesized, "invalid symbol replaced");
                synthesized
            }
            None => {
                let synthesized = Symbol::sequential(&self.symbol_prefix, index);
                debug!(%synthesized, "missing symbol synthesized");
                synthesized
            }
        }
    }

    fn scraped_at(&self, raw: &RawValue) -> UtcDateTime {
        let Some(text) = raw.non_blank_text() else {
            return self.stamped_at;
        };

        UtcDateTime::parse_lenient(&text).unwrap_or_else(|| {
            debug!(value = %text, "unparseable scraped_at replaced with normalization time");
            self.stamped_at
        })
    }
}

/// Normalize a single row stamped with the current time.
pub fn normalize_record(raw: &RawRecord, index: usize) -> CanonicalRecord {
    Normalizer::new(UtcDateTime::now()).normalize(raw, index)
}

/// Normalize a batch; rows without a usable `scraped_at` share `now`.
pub fn normalize_batch(raws: &[RawRecord], now: UtcDateTime) -> Vec<CanonicalRecord> {
    Normalizer::new(now).normalize_batch(raws)
}

fn verbatim(raw: &RawValue) -> String {
    raw.as_text().map(|text| text.into_owned()).unwrap_or_default()
}

fn label_or_unknown(raw: &RawValue) -> String {
    raw.as_text()
        .filter(|text| !text.trim().is_empty())
        .map(|text| text.into_owned())
        .unwrap_or_else(|| String::from(UNKNOWN_LABEL))
}
