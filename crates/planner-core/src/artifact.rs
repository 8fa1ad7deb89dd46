//! Documents produced for an event by the remote generation
//! process. Read-only from this client's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::null_as_default;

/// A row of the remote `artifacts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
  pub id:             Uuid,
  pub event_id:       Uuid,
  /// Free-form artifact kind, e.g. `"brief"` or `"agenda"`.
  #[serde(rename = "type", default, deserialize_with = "null_as_default")]
  pub kind:           String,
  #[serde(default)]
  pub title:          Option<String>,
  #[serde(default)]
  pub drive_web_link: Option<String>,
  pub created_at:     DateTime<Utc>,
}
