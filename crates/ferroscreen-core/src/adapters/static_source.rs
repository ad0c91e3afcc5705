use crate::source::{FetchFuture, RecordSource, SourceError, SourceId};
use crate::RawRecord;

/// In-memory source returning a fixed outcome on every fetch.
#[derive(Debug, Clone)]
pub struct StaticSource {
    outcome: Result<Vec<RawRecord>, SourceError>,
}

impl StaticSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            outcome: Ok(records),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl RecordSource for StaticSource {
    fn id(&self) -> SourceId {
        SourceId::Static
    }

    fn fetch(&self) -> FetchFuture<'_> {
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}
