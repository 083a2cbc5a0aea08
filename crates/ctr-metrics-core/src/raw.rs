//! Weakly typed upstream payloads.
//!
//! The upstream answers `{ "results": [ {...}, ... ] }` with loosely typed
//! records. These wrappers only expose lenient lookups; field meaning is
//! assigned in [`normalize`](crate::normalize) and nowhere else.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Parsed upstream body: an opaque list of result records.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub results: Vec<RawRecord>,
}

impl RawResponse {
    pub fn new(results: Vec<RawRecord>) -> Self {
        Self { results }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn first(&self) -> Option<&RawRecord> {
        self.results.first()
    }
}

/// One upstream record, keyed by upstream field names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// First present field among `keys` as a float.
    ///
    /// Numbers and numeric strings are accepted; anything else is skipped and
    /// a fully missing field reads as `0.0`.
    pub fn number(&self, keys: &[&str]) -> f64 {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(as_finite_number)
            .unwrap_or(0.0)
    }

    /// First non-empty string field among `keys`.
    pub fn text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Nested record array under the first present key among `keys`.
    /// Non-object elements are dropped.
    pub fn records(&self, keys: &[&str]) -> Vec<RawRecord> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find_map(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .cloned()
                    .filter_map(RawRecord::from_value)
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub(crate) fn as_finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
