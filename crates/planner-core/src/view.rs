//! Render-ready projections of store rows.
//!
//! Nothing here knows about a terminal or a browser. The drawing layer only
//! reads these types, so everything a user sees can be tested as plain data.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  artifact::Artifact,
  concept::Concept,
  event::Event,
  session::Session,
};

pub const EVENTS_ERROR: &str = "Error loading events.";
pub const ARTIFACTS_ERROR: &str = "Error loading artifacts.";
pub const CONCEPTS_ERROR: &str = "Error loading concepts.";

// ─── Sections ────────────────────────────────────────────────────────────────

/// A list that either loaded or collapsed into a single placeholder line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
  Loaded(Vec<T>),
  Failed(&'static str),
}

impl<T> Default for Section<T> {
  fn default() -> Self { Self::Loaded(Vec::new()) }
}

impl<T> Section<T> {
  /// Rows when loaded; empty otherwise.
  pub fn rows(&self) -> &[T] {
    match self {
      Self::Loaded(rows) => rows,
      Self::Failed(_) => &[],
    }
  }

  pub fn is_failed(&self) -> bool { matches!(self, Self::Failed(_)) }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The signed-in identity as shown in the session box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
  pub user: Option<String>,
  pub sub:  Uuid,
}

impl From<&Session> for SessionSummary {
  fn from(session: &Session) -> Self {
    Self {
      user: session.user.email.clone(),
      sub:  session.user.id,
    }
  }
}

impl SessionSummary {
  /// Two-space indented JSON, e.g. `{ "user": "a@b.c", "sub": "…" }`.
  pub fn to_pretty_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// One line of the event list, with its "Open" target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
  pub id:         Uuid,
  pub title:      String,
  pub language:   String,
  pub status:     String,
  pub drive_link: Option<String>,
}

impl From<&Event> for EventRow {
  fn from(ev: &Event) -> Self {
    Self {
      id:         ev.id,
      title:      ev.title.clone(),
      language:   ev.language.clone(),
      status:     ev.status.clone(),
      drive_link: ev.drive_folder_link.clone().filter(|l| !l.is_empty()),
    }
  }
}

impl EventRow {
  /// `title — language — status`
  pub fn summary(&self) -> String {
    format!("{} — {} — {}", self.title, self.language, self.status)
  }
}

/// Project fetched events into list rows, newest first.
pub fn project_events(mut events: Vec<Event>) -> Vec<EventRow> {
  events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  events.iter().map(EventRow::from).collect()
}

/// The header block of the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
  pub title:       String,
  pub language:    String,
  pub status:      String,
  pub folder_link: Option<String>,
}

impl From<&Event> for EventMeta {
  fn from(ev: &Event) -> Self {
    Self {
      title:       ev.title.clone(),
      language:    ev.language.clone(),
      status:      ev.status.clone(),
      folder_link: ev.drive_folder_link.clone().filter(|l| !l.is_empty()),
    }
  }
}

// ─── Artifacts & concepts ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
  pub kind:  String,
  /// The artifact title, or `"open"` when it has none.
  pub title: String,
  pub link:  Option<String>,
}

impl From<&Artifact> for ArtifactRow {
  fn from(a: &Artifact) -> Self {
    Self {
      kind:  a.kind.clone(),
      title: a
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "open".to_string()),
      link:  a.drive_web_link.clone(),
    }
  }
}

impl ArtifactRow {
  pub fn summary(&self) -> String { format!("{} — {}", self.kind, self.title) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptRow {
  pub label:          String,
  pub prompt_profile: String,
  pub link:           Option<String>,
  pub selected:       bool,
}

impl From<&Concept> for ConceptRow {
  fn from(c: &Concept) -> Self {
    Self {
      label:          c.label.clone(),
      prompt_profile: c.prompt_profile.clone().unwrap_or_default(),
      link:           c.drive_web_link.clone(),
      selected:       c.selected,
    }
  }
}

impl ConceptRow {
  /// `label — profile`, suffixed with `(selected)` for the chosen concept.
  pub fn summary(&self) -> String {
    let mut line = format!("{} — {}", self.label, self.prompt_profile);
    if self.selected {
      line.push_str(" (selected)");
    }
    line
  }
}

/// Turn a fetch result into a section, collapsing any error into
/// `placeholder`.
pub fn section<R, T, E>(
  result: Result<Vec<R>, E>,
  placeholder: &'static str,
) -> Section<T>
where
  T: for<'r> From<&'r R>,
{
  match result {
    Ok(rows) => Section::Loaded(rows.iter().map(T::from).collect()),
    Err(_) => Section::Failed(placeholder),
  }
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// Where the inputs document shown in the editor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
  Stored,
  /// No record exists yet; the document is the default preset.
  Template,
  /// The stored record could not be read; the preset is shown instead.
  Unreadable,
}

/// Everything shown in the detail panel for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
  pub event_id:     Uuid,
  pub meta:         EventMeta,
  /// Pretty-printed `{ "version", "payload" }` document.
  pub inputs_text:  String,
  pub input_source: InputSource,
  pub artifacts:    Section<ArtifactRow>,
  pub concepts:     Section<ConceptRow>,
}
