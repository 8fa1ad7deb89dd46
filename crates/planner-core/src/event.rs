//! Rows of the `events` table, the top-level record a user plans around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Title stored when the user submits a blank one.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// A row of the remote `events` table.
///
/// Ownership is enforced by the store's access rules; rows belonging to
/// other users are never returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub id:                Uuid,
  pub owner_id:          Uuid,
  pub title:             String,
  pub language:          String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub status:            String,
  #[serde(default)]
  pub drive_folder_link: Option<String>,
  pub created_at:        DateTime<Utc>,
}

/// Read a nullable column into a non-optional field. `serde(default)` alone
/// only covers a missing key, not an explicit `null`.
pub(crate) fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// The insert body for a new event. `id`, `status` and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
  pub owner_id: Uuid,
  pub title:    String,
  pub language: String,
}

impl NewEvent {
  /// Build an insert body, trimming `title` and substituting
  /// [`UNTITLED_EVENT`] when nothing is left.
  pub fn new(owner_id: Uuid, title: &str, language: impl Into<String>) -> Self {
    let trimmed = title.trim();
    let title = if trimmed.is_empty() { UNTITLED_EVENT } else { trimmed };
    Self {
      owner_id,
      title: title.to_string(),
      language: language.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_title_becomes_untitled() {
    let owner = Uuid::new_v4();
    assert_eq!(NewEvent::new(owner, "", "en").title, UNTITLED_EVENT);
    assert_eq!(NewEvent::new(owner, "  \t \n", "en").title, UNTITLED_EVENT);
  }

  #[test]
  fn title_is_trimmed() {
    let ev = NewEvent::new(Uuid::new_v4(), " Product Launch ", "en");
    assert_eq!(ev.title, "Product Launch");
    assert_eq!(ev.language, "en");
  }

  #[test]
  fn event_row_tolerates_missing_optional_columns() {
    let id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let json = format!(
      r#"{{"id":"{id}","owner_id":"{owner}","title":"Gala","language":"hu","created_at":"2025-01-02T03:04:05Z"}}"#
    );
    let ev: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(ev.title, "Gala");
    assert!(ev.status.is_empty());
    assert!(ev.drive_folder_link.is_none());
  }

  #[test]
  fn event_row_reads_null_columns_as_defaults() {
    let json = serde_json::json!({
      "id": Uuid::new_v4(),
      "owner_id": Uuid::new_v4(),
      "title": "Gala",
      "language": "en",
      "status": null,
      "drive_folder_link": null,
      "created_at": "2025-01-02T03:04:05Z",
    });
    let ev: Event = serde_json::from_value(json).unwrap();
    assert_eq!(ev.status, "");
    assert!(ev.drive_folder_link.is_none());
  }
}
