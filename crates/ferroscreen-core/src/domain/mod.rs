//! # Domain Models
//!
//! Types shared by every pipeline stage.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RawRecord`] | Untyped source row (field name → [`RawValue`]) |
//! | [`CanonicalRecord`] | Cleaned observation with concrete numeric fields |
//! | [`Symbol`] | Validated ticker symbol |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! A [`RawRecord`] carries no guarantees. A [`CanonicalRecord`] always has a
//! non-empty symbol, a sector and country (possibly [`UNKNOWN_LABEL`]) and
//! non-negative `price`, `market_cap` and `volume`; only `pe_ratio` may be
//! absent.

mod record;
mod symbol;
mod timestamp;

pub use record::{CanonicalRecord, RawRecord, RawValue, CANONICAL_FIELDS, UNKNOWN_LABEL};
pub use symbol::{Symbol, SymbolPrefix};
pub use timestamp::UtcDateTime;
