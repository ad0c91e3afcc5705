use crate::source::{FetchFuture, RecordSource, SourceId};

/// Source that never yields rows, so every batch comes from the fallback
/// generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl RecordSource for SyntheticSource {
    fn id(&self) -> SourceId {
        SourceId::Synthetic
    }

    fn fetch(&self) -> FetchFuture<'_> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
