use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Symbol, UtcDateTime};

/// Explicit bucket for records whose sector or country is absent.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Canonical column order shared by every export format.
pub const CANONICAL_FIELDS: [&str; 10] = [
    "symbol",
    "company_name",
    "sector",
    "country",
    "price",
    "market_cap",
    "volume",
    "pe_ratio",
    "source_url",
    "scraped_at",
];

/// A single untyped field value as delivered by a source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String view of the value; `None` for null.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Number(number) => Some(Cow::Owned(number.to_string())),
            Self::Text(text) => Some(Cow::Borrowed(text.as_str())),
        }
    }

    /// Trimmed text, treating null and blank strings alike.
    pub fn non_blank_text(&self) -> Option<String> {
        self.as_text()
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Number(number) => number.as_f64().map_or(Self::Null, Self::Number),
            Value::String(text) => Self::Text(text),
            Value::Bool(flag) => Self::Text(flag.to_string()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T> From<Option<T>> for RawValue
where
    T: Into<RawValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Number(number) => serializer.serialize_f64(*number),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Loosely typed source row: field name to raw value. No invariants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, RawValue>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Field value, or `Null` when the key is absent.
    pub fn get(&self, key: &str) -> &RawValue {
        const NULL: &RawValue = &RawValue::Null;
        self.0.get(key).unwrap_or(NULL)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(object: Map<String, Value>) -> Self {
        Self(
            object
                .into_iter()
                .map(|(key, value)| (key, RawValue::from(value)))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Cleaned stock observation.
///
/// Field declaration order is the canonical export order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub symbol: Symbol,
    pub company_name: String,
    pub sector: String,
    pub country: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume: u64,
    pub pe_ratio: Option<f64>,
    pub source_url: String,
    pub scraped_at: UtcDateTime,
}

impl CanonicalRecord {
    /// Traded value for the session (price × volume).
    pub fn dollar_volume(&self) -> f64 {
        self.price * self.volume as f64
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_record_reads_heterogeneous_json() {
        let record: RawRecord = serde_json::from_value(json!({
            "symbol": "AAPL",
            "market_cap": "$2.9T",
            "price": 189.5,
            "pe_ratio": null,
            "halted": false
        }))
        .expect("object deserializes");

        assert_eq!(record.get("symbol"), &RawValue::text("AAPL"));
        assert_eq!(record.get("price"), &RawValue::Number(189.5));
        assert!(record.get("pe_ratio").is_null());
        assert_eq!(record.get("halted"), &RawValue::text("false"));
        assert!(record.get("missing").is_null());
    }

    #[test]
    fn blank_text_is_treated_as_absent() {
        assert_eq!(RawValue::text("   ").non_blank_text(), None);
        assert_eq!(
            RawValue::text(" Energy ").non_blank_text().as_deref(),
            Some("Energy")
        );
        assert_eq!(RawValue::Null.non_blank_text(), None);
    }

    #[test]
    fn dollar_volume_multiplies_price_and_volume() {
        let record = CanonicalRecord {
            symbol: Symbol::parse("MSFT").expect("valid"),
            company_name: String::from("Microsoft"),
            sector: String::from("Technology"),
            country: String::from("United States"),
            price: 10.5,
            market_cap: 1_000.0,
            volume: 200,
            pe_ratio: None,
            source_url: String::new(),
            scraped_at: UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp"),
        };

        assert_eq!(record.dollar_volume(), 2_100.0);
    }
}
