//! Alternative creative directions generated for an event.
//!
//! The `selected` flag is only ever changed by the remote select-concept
//! action, never by a direct write from this client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::null_as_default;

/// A row of the remote `concepts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
  pub id:             Uuid,
  pub event_id:       Uuid,
  pub label:          String,
  #[serde(default)]
  pub prompt_profile: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub selected:       bool,
  #[serde(default)]
  pub drive_web_link: Option<String>,
  pub created_at:     DateTime<Utc>,
}
