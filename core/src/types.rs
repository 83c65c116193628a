//! Domain DTOs for the widgets API.
//!
//! # Design
//! Request payloads are plain value types whose fields are always
//! serialized: an unset string goes out as `""` and an unset number as `0`,
//! matching what the service has always received from this client. Callers
//! start from `Default` and fill in only what they mean to send. The one
//! exception is the `type` discriminator: `WidgetKind` defaults to `Card`,
//! so a defaulted `Card` or `SimpleCard` sends `"type":"card"`, not `""`.
//!
//! Response records decode leniently: a missing key and an explicit `null`
//! both leave the zero value. The exception is the `card` payload, whose
//! shape depends on the sibling `type` discriminator and is decoded into
//! `CardPayload` after the rest of the record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode `null` as `T::default()`. Missing keys are covered separately by
/// `#[serde(default)]`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The widget `type` discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    #[default]
    Card,
    Sticker,
    Shape,
    Text,
    Line,
    /// Any discriminator this client does not know about yet.
    Other(String),
}

impl WidgetKind {
    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Card => "card",
            WidgetKind::Sticker => "sticker",
            WidgetKind::Shape => "shape",
            WidgetKind::Text => "text",
            WidgetKind::Line => "line",
            WidgetKind::Other(kind) => kind,
        }
    }
}

impl From<String> for WidgetKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "card" => WidgetKind::Card,
            "sticker" => WidgetKind::Sticker,
            "shape" => WidgetKind::Shape,
            "text" => WidgetKind::Text,
            "line" => WidgetKind::Line,
            _ => WidgetKind::Other(kind),
        }
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignee {
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    #[serde(deserialize_with = "null_as_default")]
    pub background_color: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request payload for creating a fully specified card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub assignee: Assignee,
    pub style: Style,
}

/// Request payload for creating a card with only a title and description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleCard {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    pub description: String,
}

impl SimpleCard {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: WidgetKind::Card,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Partial update that only changes a card's assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssigneeUpdate {
    pub assignee: Assignee,
}

impl AssigneeUpdate {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            assignee: Assignee {
                user_id: user_id.into(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Who created or last modified a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Actor {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Logo {
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomField {
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub main_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub font_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon_shape: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rounded_corners: bool,
}

/// Typed view of the `card` payload of a `card` widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDetails {
    pub logo: Option<Logo>,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_fields: Vec<CustomField>,
}

/// The `card` field of a widget record, interpreted through the widget's
/// `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum CardPayload {
    Card(CardDetails),
    /// Payload of a widget kind without a typed view. The raw JSON is kept
    /// untouched.
    Other { kind: WidgetKind, raw: Value },
}

impl CardPayload {
    pub fn decode(kind: &WidgetKind, raw: Value) -> Result<Self, serde_json::Error> {
        match kind {
            WidgetKind::Card => serde_json::from_value(raw).map(CardPayload::Card),
            other => Ok(CardPayload::Other {
                kind: other.clone(),
                raw,
            }),
        }
    }

    pub fn as_card(&self) -> Option<&CardDetails> {
        match self {
            CardPayload::Card(details) => Some(details),
            CardPayload::Other { .. } => None,
        }
    }
}

/// A widget as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawWidgetRecord")]
pub struct WidgetRecord {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub description: String,
    pub date: String,
    pub card: Option<CardPayload>,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub assignee: Assignee,
    pub style: Style,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Actor,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Actor,
}

/// Wire form of `WidgetRecord` before the `card` payload is interpreted.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawWidgetRecord {
    #[serde(deserialize_with = "null_as_default")]
    id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(deserialize_with = "null_as_default")]
    title: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    #[serde(deserialize_with = "null_as_default")]
    date: String,
    card: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    x: f64,
    #[serde(deserialize_with = "null_as_default")]
    y: f64,
    #[serde(deserialize_with = "null_as_default")]
    rotation: f64,
    #[serde(deserialize_with = "null_as_default")]
    scale: f64,
    #[serde(deserialize_with = "null_as_default")]
    assignee: Assignee,
    #[serde(deserialize_with = "null_as_default")]
    style: Style,
    created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    created_by: Actor,
    modified_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    modified_by: Actor,
}

impl TryFrom<RawWidgetRecord> for WidgetRecord {
    type Error = serde_json::Error;

    fn try_from(raw: RawWidgetRecord) -> Result<Self, Self::Error> {
        let kind = WidgetKind::from(raw.kind);
        let card = match raw.card {
            None | Some(Value::Null) => None,
            Some(value) => Some(CardPayload::decode(&kind, value)?),
        };
        Ok(Self {
            id: raw.id,
            kind,
            title: raw.title,
            description: raw.description,
            date: raw.date,
            card,
            x: raw.x,
            y: raw.y,
            rotation: raw.rotation,
            scale: raw.scale,
            assignee: raw.assignee,
            style: raw.style,
            created_at: raw.created_at,
            created_by: raw.created_by,
            modified_at: raw.modified_at,
            modified_by: raw.modified_by,
        })
    }
}

/// Envelope returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WidgetList {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: usize,
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<WidgetRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    #[serde(deserialize_with = "null_as_default")]
    pub editable: bool,
}

/// A widget returned by a create or update call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WidgetDetail {
    #[serde(flatten)]
    pub widget: WidgetRecord,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Capabilities,
}

/// Error body sent alongside non-success statuses. Only `message` is read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}
