//! Codec for per-widget integration metadata.
//!
//! On the wire a widget's metadata is keyed by the owning application's ID:
//!
//! ```json
//! {"title": "Fix login", "metadata": {"3074457352146652951": {"issue": "STP-346"}}}
//! ```
//!
//! Inside the crate the same information is the flat `WidgetMetadata`
//! triple. The dynamic-key map exists only at the serialization boundary.
//!
//! Decoding is case-insensitive on key names: the service has been seen
//! returning `Title`, `METADATA` and friends. Keys are folded to lowercase
//! in one pass before any field is read.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One issue-tracker link on a widget, owned by application `app_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetMetadata {
    pub title: String,
    pub app_id: String,
    pub issue: String,
}

impl WidgetMetadata {
    pub fn new(
        title: impl Into<String>,
        app_id: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            app_id: app_id.into(),
            issue: issue.into(),
        }
    }
}

#[derive(Serialize)]
struct MetadataEnvelope<'a> {
    title: &'a str,
    metadata: BTreeMap<&'a str, IssueEntry<'a>>,
}

#[derive(Serialize)]
struct IssueEntry<'a> {
    issue: &'a str,
}

impl Serialize for WidgetMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut metadata = BTreeMap::new();
        metadata.insert(self.app_id.as_str(), IssueEntry { issue: &self.issue });
        MetadataEnvelope {
            title: &self.title,
            metadata,
        }
        .serialize(serializer)
    }
}

/// Metadata as returned by the widget endpoints, together with the widget's
/// identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub widget_type: String,
    pub id: String,
    pub metadata: WidgetMetadata,
}

impl MetadataRecord {
    /// Decode from an arbitrary JSON value.
    ///
    /// Unknown keys are ignored and missing keys leave the field empty. A
    /// known key holding the wrong JSON type, `null` included, is an error.
    /// When `metadata` carries several application IDs, the greatest one in
    /// lexicographic order wins, independent of how the map was ordered on
    /// the wire.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let fields = match value {
            Value::Object(fields) => fold_keys(fields),
            other => {
                return Err(serde_json::Error::custom(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
        };

        let mut record = MetadataRecord {
            widget_type: string_field(&fields, "type")?,
            id: string_field(&fields, "id")?,
            metadata: WidgetMetadata {
                title: string_field(&fields, "title")?,
                ..WidgetMetadata::default()
            },
        };

        let entries = match fields.get("metadata") {
            None => return Ok(record),
            Some(Value::Object(entries)) => entries,
            Some(other) => return Err(type_mismatch("metadata", "an object", other)),
        };
        let mut selected: Option<(&String, Map<String, Value>)> = None;
        for (app_id, entry) in entries {
            let Value::Object(entry) = entry else {
                return Err(type_mismatch(app_id, "an object", entry));
            };
            if selected.as_ref().map_or(true, |(current, _)| app_id >= *current) {
                selected = Some((app_id, fold_keys(entry.clone())));
            }
        }
        if let Some((app_id, entry)) = selected {
            record.metadata.app_id = app_id.clone();
            record.metadata.issue = string_field(&entry, "issue")?;
        }

        Ok(record)
    }
}

impl<'de> Deserialize<'de> for MetadataRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        MetadataRecord::from_value(value).map_err(D::Error::custom)
    }
}

/// Serialize `metadata` into its request body.
pub fn encode(metadata: &WidgetMetadata) -> Result<String, serde_json::Error> {
    serde_json::to_string(metadata)
}

/// Decode a response body into a `MetadataRecord`.
pub fn decode(body: &str) -> Result<MetadataRecord, serde_json::Error> {
    serde_json::from_str(body)
}

fn fold_keys(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, serde_json::Error> {
    match fields.get(key) {
        None => Ok(String::new()),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(type_mismatch(key, "a string", other)),
    }
}

fn type_mismatch(key: &str, expected: &str, found: &Value) -> serde_json::Error {
    serde_json::Error::custom(format!(
        "field `{key}` must be {expected}, got {}",
        json_type(found)
    ))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
