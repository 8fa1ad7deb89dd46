//! Event inputs: the versioned configuration document attached to an event.
//!
//! Each event has at most one input record. Writes replace the whole record
//! (last write wins). Version `1.0` payloads are typed when they fit the
//! schema; anything else is carried as raw JSON so a stored record is always
//! shown and saved back as it is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::{Error, Result, event::Event};

/// The version every save is written under.
pub const INPUT_VERSION: &str = "1.0";

// ─── Version 1.0 schema ──────────────────────────────────────────────────────

/// Payload of a version `1.0` input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV1 {
  pub basics: Basics,
  /// Top-level keys outside the schema, kept verbatim.
  #[serde(flatten)]
  pub extra:  Map<String, Value>,
}

/// The "basics" block: what, when, where, how many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basics {
  pub title:              String,
  #[serde(rename = "type")]
  pub event_type:         String,
  pub language:           String,
  /// IANA zone name, e.g. `"Europe/Budapest"`.
  pub timezone:           String,
  pub date_range:         DateRange,
  pub location:           Location,
  pub expected_attendees: u32,
  #[serde(flatten)]
  pub extra:              Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  /// `"onsite"`, `"online"` or `"hybrid"`; not restricted here.
  pub mode:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub city:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub country: Option<String>,
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// An input payload, typed when it fits the current schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputPayload {
  V1(PayloadV1),
  /// Any other JSON, including partial `1.0` payloads and non-objects.
  Generic(Value),
}

impl InputPayload {
  /// Interpret `value` under `version`. Never fails: a payload that does not
  /// fit its schema is kept as [`InputPayload::Generic`].
  pub fn decode(version: &str, value: Value) -> Self {
    if version != INPUT_VERSION {
      return Self::Generic(value);
    }
    match serde_json::from_value::<PayloadV1>(value.clone()) {
      Ok(typed) => Self::V1(typed),
      Err(e) => {
        debug!(error = %e, "payload does not fit the 1.0 schema, keeping it untyped");
        Self::Generic(value)
      }
    }
  }

  pub fn to_value(&self) -> Result<Value> { Ok(serde_json::to_value(self)?) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A row of the remote `event_inputs` table, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInput {
  pub event_id: Uuid,
  pub version:  String,
  pub payload:  InputPayload,
}

/// The editable text form: `{ "version": ..., "payload": ... }`.
#[derive(Serialize)]
struct Document<'a> {
  version: &'a str,
  payload: &'a InputPayload,
}

impl EventInput {
  /// Decode a stored record. See [`InputPayload::decode`].
  pub fn decode(event_id: Uuid, version: String, payload: Value) -> Self {
    let payload = InputPayload::decode(&version, payload);
    Self {
      event_id,
      version,
      payload,
    }
  }

  /// The preset shown for an event that has no input record yet.
  pub fn template(event: &Event) -> Self {
    let day = default_event_date();
    Self {
      event_id: event.id,
      version:  INPUT_VERSION.to_string(),
      payload:  InputPayload::V1(PayloadV1 {
        basics: Basics {
          title:              event.title.clone(),
          event_type:         "corporate".to_string(),
          language:           event.language.clone(),
          timezone:           "Europe/Budapest".to_string(),
          date_range:         DateRange {
            start: day,
            end:   day,
          },
          location:           Location {
            mode:    "onsite".to_string(),
            city:    Some("Budapest".to_string()),
            country: Some("HU".to_string()),
          },
          expected_attendees: 80,
          extra:              Map::new(),
        },
        extra:  Map::new(),
      }),
    }
  }

  /// Parse a document edited as text into a record for `event_id`.
  ///
  /// Only text that is not JSON is rejected. The document's own `version`
  /// field is ignored and saves are always written under [`INPUT_VERSION`].
  /// A missing `payload` key is stored as `null`.
  pub fn from_document(event_id: Uuid, text: &str) -> Result<Self> {
    let mut doc: Value = serde_json::from_str(text).map_err(Error::InvalidJson)?;
    let payload = doc
      .get_mut("payload")
      .map(Value::take)
      .unwrap_or(Value::Null);
    Ok(Self::decode(event_id, INPUT_VERSION.to_string(), payload))
  }

  /// Render as pretty-printed JSON for editing.
  pub fn to_document(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Document {
      version: &self.version,
      payload: &self.payload,
    })?)
  }
}

fn default_event_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 12, 1).unwrap_or_default()
}
