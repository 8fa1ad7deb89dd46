//! Wire shapes exchanged with PostgREST and GoTrue, and their conversion to
//! the domain types in `planner-core`.

use chrono::{DateTime, Duration, Utc};
use planner_core::{
  input::EventInput,
  session::{Session, User},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

// ─── Column lists ─────────────────────────────────────────────────────────────

pub const EVENT_COLUMNS: &str =
  "id,owner_id,title,language,status,drive_folder_link,created_at";
pub const INPUT_COLUMNS: &str = "event_id,version,payload";
pub const ARTIFACT_COLUMNS: &str = "id,event_id,type,title,drive_web_link,created_at";
pub const CONCEPT_COLUMNS: &str =
  "id,event_id,label,prompt_profile,selected,drive_web_link,created_at";

/// PostgREST equality filter value.
pub fn eq(id: Uuid) -> String { format!("eq.{id}") }

// ─── event_inputs ─────────────────────────────────────────────────────────────

/// An `event_inputs` row with its payload still untyped.
#[derive(Debug, Serialize, Deserialize)]
pub struct InputRow {
  pub event_id: Uuid,
  pub version:  String,
  #[serde(default)]
  pub payload:  Value,
}

impl InputRow {
  pub fn encode(input: &EventInput) -> Result<Self> {
    Ok(Self {
      event_id: input.event_id,
      version:  input.version.clone(),
      payload:  input.payload.to_value()?,
    })
  }

  pub fn decode(self) -> EventInput { EventInput::decode(self.event_id, self.version, self.payload) }
}

// ─── GoTrue ───────────────────────────────────────────────────────────────────

/// Body of `POST /otp`.
#[derive(Debug, Serialize)]
pub struct OtpRequest<'a> {
  pub email:       &'a str,
  pub create_user: bool,
}

/// Body of `POST /verify`.
#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
  #[serde(rename = "type")]
  pub kind:  &'static str,
  pub email: &'a str,
  pub token: &'a str,
}

/// Body of `POST /token?grant_type=refresh_token`.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
  pub refresh_token: &'a str,
}

/// The session object GoTrue returns from `/verify` and `/token`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
  pub access_token:  String,
  pub refresh_token: String,
  #[serde(default)]
  pub token_type:    Option<String>,
  /// Seconds since the epoch.
  #[serde(default)]
  pub expires_at:    Option<i64>,
  /// Seconds from now; used when `expires_at` is absent.
  #[serde(default)]
  pub expires_in:    Option<i64>,
  pub user:          User,
}

impl TokenResponse {
  pub fn into_session(self, now: DateTime<Utc>) -> Session {
    let expires_at = self
      .expires_at
      .and_then(|ts| DateTime::from_timestamp(ts, 0))
      .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));
    Session {
      access_token: self.access_token,
      refresh_token: self.refresh_token,
      token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
      expires_at,
      user: self.user,
    }
  }
}
