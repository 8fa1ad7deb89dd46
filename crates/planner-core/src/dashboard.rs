//! Dashboard state and the loaders that fill it.
//!
//! The loaders are plain async functions over a [`PlannerStore`]; the caller
//! passes the session and the current event explicitly. Each load replaces
//! the part of [`DashboardState`] it owns wholesale.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error,
  event::NewEvent,
  input::EventInput,
  session::{AuthEvent, AuthState, Session, User},
  store::PlannerStore,
  view::{
    ARTIFACTS_ERROR, CONCEPTS_ERROR, EVENTS_ERROR, EventDetail, EventMeta, EventRow,
    InputSource, Section, SessionSummary, project_events, section,
  },
};

// ─── State ───────────────────────────────────────────────────────────────────

/// The two top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
  /// Signed out: sign-in form only.
  #[default]
  Landing,
  Dashboard,
}

/// Everything the dashboard shows, derived from remote rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
  pub view:    View,
  pub session: Option<SessionSummary>,
  pub events:  Section<EventRow>,
  /// Detail panel; `None` while hidden.
  pub detail:  Option<EventDetail>,
  /// The event actions and saves apply to.
  pub current_event: Option<Uuid>,
}

impl DashboardState {
  /// React to an auth change. Returns `true` when the event list should be
  /// (re)loaded, which is every change except a silent token refresh.
  ///
  /// Losing the session discards all dashboard state.
  pub fn apply_auth(&mut self, auth: &AuthState) -> bool {
    match &auth.session {
      Some(session) => {
        self.session = Some(SessionSummary::from(session));
        self.view = View::Dashboard;
        auth.event != AuthEvent::TokenRefreshed
      }
      None => {
        *self = Self::default();
        false
      }
    }
  }
}

// ─── Event list ──────────────────────────────────────────────────────────────

/// Fetch the user's events, newest first. Errors become a single
/// placeholder row.
pub async fn load_events<S: PlannerStore>(
  store: &S,
  session: &Session,
  user: &User,
) -> Section<EventRow> {
  match store.list_events(session, user.id).await {
    Ok(events) => {
      debug!(count = events.len(), "events loaded");
      Section::Loaded(project_events(events))
    }
    Err(e) => {
      warn!(error = %e, "loading events failed");
      Section::Failed(EVENTS_ERROR)
    }
  }
}

/// Insert an event, then reload the whole list.
///
/// The title is trimmed and defaults to "Untitled Event". On insert failure
/// the list is not reloaded and the message to show is returned.
pub async fn create_event<S: PlannerStore>(
  store: &S,
  session: &Session,
  user: &User,
  title: &str,
  language: &str,
) -> Result<Section<EventRow>, String> {
  let new_event = NewEvent::new(user.id, title, language);
  match store.create_event(session, &new_event).await {
    Ok(created) => debug!(id = %created.id, "event created"),
    Err(e) => {
      warn!(error = %e, "creating event failed");
      return Err(format!("Create failed: {e}"));
    }
  }
  Ok(load_events(store, session, user).await)
}

// ─── Event detail ────────────────────────────────────────────────────────────

/// Load the detail panel for `event_id`.
///
/// The event row must load; everything after it degrades per section.
/// Artifacts and concepts are fetched concurrently.
pub async fn open_event<S: PlannerStore>(
  store: &S,
  session: &Session,
  event_id: Uuid,
) -> Result<EventDetail, S::Error> {
  let event = store.get_event(session, event_id).await?;

  let (input, input_source) = match store.get_input(session, event_id).await {
    Ok(Some(input)) => (input, InputSource::Stored),
    Ok(None) => (EventInput::template(&event), InputSource::Template),
    Err(e) => {
      warn!(error = %e, %event_id, "loading inputs failed, showing defaults");
      (EventInput::template(&event), InputSource::Unreadable)
    }
  };
  let inputs_text = input.to_document().unwrap_or_default();

  let (artifacts, concepts) = tokio::join!(
    store.list_artifacts(session, event_id),
    store.list_concepts(session, event_id),
  );
  if let Err(e) = &artifacts {
    warn!(error = %e, %event_id, "loading artifacts failed");
  }
  if let Err(e) = &concepts {
    warn!(error = %e, %event_id, "loading concepts failed");
  }

  Ok(EventDetail {
    event_id,
    meta: EventMeta::from(&event),
    inputs_text,
    input_source,
    artifacts: section(artifacts, ARTIFACTS_ERROR),
    concepts: section(concepts, CONCEPTS_ERROR),
  })
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Result of a save, as shown under the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  Saved,
  /// Rejected locally; nothing was sent.
  Invalid(String),
  /// The store refused the write.
  Failed(String),
}

impl SaveOutcome {
  pub fn message(&self) -> String {
    match self {
      Self::Saved => "Saved ✓".to_string(),
      Self::Invalid(msg) => msg.clone(),
      Self::Failed(msg) => format!("Error: {msg}"),
    }
  }
}

/// Parse `text` and replace the input record of `event_id` with it.
///
/// Text that does not parse never reaches the store. Any JSON that does is
/// written, typed or not.
pub async fn save_inputs<S: PlannerStore>(
  store: &S,
  session: &Session,
  event_id: Option<Uuid>,
  text: &str,
) -> SaveOutcome {
  let Some(event_id) = event_id else {
    return SaveOutcome::Invalid(Error::NoEventOpen.to_string());
  };
  let input = match EventInput::from_document(event_id, text) {
    Ok(input) => input,
    Err(e) => return SaveOutcome::Invalid(e.to_string()),
  };
  match store.upsert_input(session, &input).await {
    Ok(()) => {
      debug!(%event_id, "inputs saved");
      SaveOutcome::Saved
    }
    Err(e) => {
      warn!(error = %e, %event_id, "saving inputs failed");
      SaveOutcome::Failed(e.to_string())
    }
  }
}
