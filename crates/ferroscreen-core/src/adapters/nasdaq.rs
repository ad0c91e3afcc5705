use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::source::{FetchFuture, RecordSource, SourceError, SourceId};
use crate::{RawRecord, RawValue};

const SCREENER_URL: &str = "https://api.nasdaq.com/api/screener/stocks";
const QUOTE_PAGE_URL: &str = "https://www.nasdaq.com/market-activity/stocks";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// NASDAQ public stock screener.
///
/// Rows are passed through untouched apart from key renaming; numeric
/// cleanup happens in the normalizer.
#[derive(Clone)]
pub struct NasdaqScreenerSource {
    http_client: Arc<dyn HttpClient>,
    table_size: usize,
    timeout_ms: u64,
}

impl Default for NasdaqScreenerSource {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            table_size: 100,
            timeout_ms: 10_000,
        }
    }
}

impl NasdaqScreenerSource {
    /// Source backed by a real reqwest client.
    pub fn live() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            ..Self::default()
        }
    }

    pub fn with_table_size(mut self, table_size: usize) -> Self {
        self.table_size = table_size;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn request(&self) -> HttpRequest {
        HttpRequest::get(SCREENER_URL)
            .with_query("tablesize", self.table_size.to_string())
            .with_query("offset", "0")
            .with_query("download", "true")
            .with_header("user-agent", BROWSER_USER_AGENT)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms)
    }
}

impl RecordSource for NasdaqScreenerSource {
    fn id(&self) -> SourceId {
        SourceId::Nasdaq
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async move {
            let response = self
                .http_client
                .execute(self.request())
                .await
                .map_err(|error| {
                    if error.retryable() {
                        SourceError::unavailable(format!(
                            "nasdaq transport error: {}",
                            error.message()
                        ))
                    } else {
                        SourceError::internal(format!(
                            "nasdaq transport error: {}",
                            error.message()
                        ))
                    }
                })?;

            if !response.is_success() {
                return Err(SourceError::unavailable(format!(
                    "nasdaq screener returned status {}",
                    response.status
                )));
            }

            let records = parse_screener_body(&response.body)?;
            info!(rows = records.len(), "nasdaq screener rows received");
            Ok(records)
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScreenerEnvelope {
    data: Option<ScreenerData>,
}

#[derive(Debug, Deserialize)]
struct ScreenerData {
    rows: Option<Vec<Map<String, Value>>>,
}

/// Map a screener JSON body into raw records with canonical keys.
pub(crate) fn parse_screener_body(body: &str) -> Result<Vec<RawRecord>, SourceError> {
    let envelope: ScreenerEnvelope = serde_json::from_str(body).map_err(|error| {
        SourceError::invalid_response(format!("nasdaq screener body is not JSON: {error}"))
    })?;

    let rows = envelope
        .data
        .and_then(|data| data.rows)
        .ok_or_else(|| SourceError::invalid_response("nasdaq screener body has no data.rows"))?;

    Ok(rows.into_iter().map(screener_row_to_raw).collect())
}

fn screener_row_to_raw(mut row: Map<String, Value>) -> RawRecord {
    let mut take = |key: &str| row.remove(key).map_or(RawValue::Null, RawValue::from);

    let symbol = take("symbol");
    let source_url = symbol
        .non_blank_text()
        .map(|symbol| format!("{QUOTE_PAGE_URL}/{}", symbol.to_ascii_lowercase()))
        .map_or(RawValue::Null, RawValue::Text);

    let record = RawRecord::new()
        .with("company_name", take("name"))
        .with("sector", take("sector"))
        .with("country", take("country"))
        .with("market_cap", take("marketCap"))
        .with("price", take("lastsale"))
        .with("volume", take("volume"))
        .with("pe_ratio", take("pe_ratio"))
        .with("source_url", source_url)
        .with("symbol", symbol);

    debug!(fields = record.len(), "screener row mapped");
    record
}
