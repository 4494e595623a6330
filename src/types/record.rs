//! Free-form report records.
//!
//! `ReportRecord` is a flat key-value mapping with no enforced schema.
//! Well-known fields (`report_id`, `description`, `user_id`, `status`,
//! `accept`) get typed accessors, but arbitrary extra fields ride along
//! untouched so producers and consumers can evolve independently.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Field under which the ingestion layer attaches raw image bytes.
///
/// The payload is owned by the image pipeline and is stripped before a
/// record is persisted.
pub const IMAGE_BYTES_KEY: &str = "image_bytes";

/// One report's data, as handed over by the ingestion layer.
///
/// Serializes transparently as a plain JSON object, so any object line in
/// the log round-trips through this type without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRecord {
    fields: Map<String, Value>,
}

impl ReportRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, classifying its value for JSON compatibility.
    ///
    /// Values that cannot be represented as JSON (for example maps with
    /// non-string keys) are stored as their debug string form instead of
    /// failing the whole record; a warning names the offending key.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Serialize + fmt::Debug,
    {
        let key = key.into();
        let value = match serde_json::to_value(&value) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    key = %key,
                    error = %err,
                    "field value is not JSON-serializable, storing its string form"
                );
                Value::String(format!("{value:?}"))
            }
        };
        self.fields.insert(key, value);
        self
    }

    /// Build a record from an already-parsed JSON value.
    ///
    /// Returns `None` if the value is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Look up a raw field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The record's primary identifier, if it carries one as a string.
    pub fn report_id(&self) -> Option<&str> {
        self.str_field("report_id")
    }

    /// The free-text description, if present as a string.
    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// The submitting user's identifier, if present as a string.
    pub fn user_id(&self) -> Option<&str> {
        self.str_field("user_id")
    }

    /// A field rendered for diagnostics: strings verbatim, other values
    /// as JSON, missing fields as `"unknown"`.
    pub fn display_field(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        }
    }

    /// A copy of the fields with the image payload removed.
    ///
    /// This is the exact shape that gets persisted: everything the caller
    /// supplied except `image_bytes`.
    pub fn sanitized(&self) -> Map<String, Value> {
        let mut clean = self.fields.clone();
        clean.remove(IMAGE_BYTES_KEY);
        clean
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for ReportRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
