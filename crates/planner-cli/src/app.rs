//! Application state machine and key dispatcher.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use planner_core::{
  Error,
  action::{RemoteAction, dispatch},
  dashboard::{DashboardState, SaveOutcome, View, create_event, load_events, open_event, save_inputs},
  session::{AuthState, Session, SessionManager, SignInPrompt, User},
  view::{EventRow, InputSource},
};
use planner_supabase::{FileSessionCache, SupabaseClient};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::client::BackendClient;

/// How long "Saved ✓" stays under the editor.
const SAVED_MESSAGE_TTL: Duration = Duration::from_millis(1500);

pub(crate) const UNREADABLE_SAVE_MESSAGE: &str =
  "Stored inputs could not be loaded. Edit them or reopen the event before saving.";
pub(crate) const EMPTY_CODE_MESSAGE: &str = "Enter the code from the email.";

pub type Sessions = SessionManager<SupabaseClient, FileSessionCache>;

// ─── Focus & modes ────────────────────────────────────────────────────────────

/// Which list `j`/`k` move through on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
  #[default]
  Events,
  Artifacts,
  Concepts,
}

impl Focus {
  fn next(self) -> Self {
    match self {
      Self::Events => Self::Artifacts,
      Self::Artifacts => Self::Concepts,
      Self::Concepts => Self::Events,
    }
  }
}

/// Text entry currently capturing keys on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Entry {
  #[default]
  None,
  Filter,
  NewTitle,
}

/// The two fields of the sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LandingField {
  #[default]
  Email,
  Code,
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit,
  /// Suspend the terminal and open the inputs document in `$EDITOR`.
  EditInputs,
}

/// Settings the app needs beyond its clients.
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub redirect_to: Option<String>,
  pub languages:   Vec<String>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Remote-derived state: view, session summary, event list, detail.
  pub dashboard: DashboardState,

  pub sessions: Sessions,
  auth_rx:      watch::Receiver<AuthState>,
  store:        SupabaseClient,
  backend:      Option<BackendClient>,
  config:       AppConfig,

  // Landing form.
  pub email:         String,
  pub code:          String,
  pub landing_field: LandingField,
  pub sign_in_msg:   String,

  // Dashboard.
  pub focus:           Focus,
  pub entry:           Entry,
  pub filter:          String,
  pub new_title:       String,
  pub language_idx:    usize,
  pub list_cursor:     usize,
  pub artifact_cursor: usize,
  pub concept_cursor:  usize,
  /// Shown in the detail pane when the event row itself failed to load.
  pub detail_error:    Option<String>,
  /// The inputs document was edited since it was loaded or saved.
  pub inputs_dirty:    bool,
  pub inputs_msg:      String,
  pub(crate) inputs_msg_until: Option<Instant>,

  /// Modal message; any key dismisses it.
  pub alert:      Option<String>,
  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(
    sessions: Sessions,
    store: SupabaseClient,
    backend: Option<BackendClient>,
    config: AppConfig,
  ) -> Self {
    let auth_rx = sessions.subscribe();
    Self {
      dashboard: DashboardState::default(),
      sessions,
      auth_rx,
      store,
      backend,
      config,
      email: String::new(),
      code: String::new(),
      landing_field: LandingField::Email,
      sign_in_msg: String::new(),
      focus: Focus::Events,
      entry: Entry::None,
      filter: String::new(),
      new_title: String::new(),
      language_idx: 0,
      list_cursor: 0,
      artifact_cursor: 0,
      concept_cursor: 0,
      detail_error: None,
      inputs_dirty: false,
      inputs_msg: String::new(),
      inputs_msg_until: None,
      alert: None,
      status_msg: String::new(),
    }
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// Restore the cached session and apply it.
  pub async fn restore(&mut self) {
    self.sessions.restore().await;
    self.sync_auth().await;
  }

  /// Apply any auth change published since the last call.
  pub async fn sync_auth(&mut self) {
    if !self.auth_rx.has_changed().unwrap_or(false) {
      return;
    }
    let state = self.auth_rx.borrow_and_update().clone();
    debug!(event = ?state.event, signed_in = state.session.is_some(), "auth state changed");
    if state.session.is_none() {
      self.reset_dashboard();
    }
    if self.dashboard.apply_auth(&state) {
      self.reload_events().await;
    }
  }

  fn reset_dashboard(&mut self) {
    self.focus = Focus::Events;
    self.entry = Entry::None;
    self.filter.clear();
    self.new_title.clear();
    self.list_cursor = 0;
    self.artifact_cursor = 0;
    self.concept_cursor = 0;
    self.detail_error = None;
    self.inputs_dirty = false;
    self.inputs_msg.clear();
    self.inputs_msg_until = None;
    self.code.clear();
    self.landing_field = LandingField::Email;
    self.status_msg.clear();
  }

  /// A live session together with the user the auth service reports for it.
  async fn signed_in(&self) -> Option<(Session, User)> {
    let session = self.sessions.access_session().await?;
    let user = self.sessions.current_user().await?;
    Some((session, user))
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Reload the event list. Does nothing without a signed-in user.
  pub async fn reload_events(&mut self) {
    let Some((session, user)) = self.signed_in().await else {
      debug!("no signed-in user, event list not loaded");
      return;
    };
    self.dashboard.events = load_events(&self.store, &session, &user).await;
    self.clamp_list_cursor();
  }

  async fn create(&mut self) {
    let Some((session, user)) = self.signed_in().await else {
      self.show_alert(Error::NotSignedIn);
      return;
    };
    let language = self.language().to_string();
    match create_event(&self.store, &session, &user, &self.new_title, &language).await {
      Ok(events) => {
        self.dashboard.events = events;
        self.new_title.clear();
        self.filter.clear();
        self.list_cursor = 0;
      }
      Err(msg) => self.show_alert(msg),
    }
  }

  async fn open(&mut self, event_id: Uuid) {
    let Some(session) = self.sessions.access_session().await else {
      self.show_alert(Error::NotSignedIn);
      return;
    };
    self.dashboard.current_event = Some(event_id);
    self.artifact_cursor = 0;
    self.concept_cursor = 0;
    self.inputs_dirty = false;
    self.inputs_msg.clear();
    self.inputs_msg_until = None;
    match open_event(&self.store, &session, event_id).await {
      Ok(detail) => {
        self.dashboard.detail = Some(detail);
        self.detail_error = None;
      }
      Err(e) => {
        self.dashboard.detail = None;
        self.detail_error = Some(format!("Error loading event: {e}"));
      }
    }
  }

  async fn save(&mut self) {
    if self.dashboard.current_event.is_none() {
      self.show_alert(Error::NoEventOpen);
      return;
    }
    // Defaults shown over a record that failed to load must not replace it
    // unless the user actually edited them.
    let unreadable = self
      .dashboard
      .detail
      .as_ref()
      .is_some_and(|d| d.input_source == InputSource::Unreadable);
    if unreadable && !self.inputs_dirty {
      self.inputs_msg = UNREADABLE_SAVE_MESSAGE.to_string();
      self.inputs_msg_until = None;
      return;
    }
    let Some(session) = self.sessions.access_session().await else {
      self.show_alert(Error::NotSignedIn);
      return;
    };
    let text = self.inputs_text().unwrap_or_default().to_string();
    let outcome = save_inputs(&self.store, &session, self.dashboard.current_event, &text).await;
    self.inputs_msg = outcome.message();
    self.inputs_msg_until = None;
    if outcome == SaveOutcome::Saved {
      self.inputs_dirty = false;
      self.inputs_msg_until = Some(Instant::now() + SAVED_MESSAGE_TTL);
      if let Some(detail) = &mut self.dashboard.detail {
        detail.input_source = InputSource::Stored;
      }
    }
  }

  async fn run_action(&mut self, action: RemoteAction) {
    match dispatch(self.backend.as_ref(), self.dashboard.current_event, action).await {
      Ok(outcome) => self.show_alert(outcome.message()),
      Err(e) => self.show_alert(e),
    }
  }

  /// Expire timed messages.
  pub fn tick(&mut self, now: Instant) {
    if self.inputs_msg_until.is_some_and(|until| now >= until) {
      self.inputs_msg.clear();
      self.inputs_msg_until = None;
    }
  }

  // ── Inputs document ───────────────────────────────────────────────────────

  pub fn inputs_text(&self) -> Option<&str> {
    self.dashboard.detail.as_ref().map(|d| d.inputs_text.as_str())
  }

  /// Replace the editor buffer with text coming back from `$EDITOR`.
  pub fn set_inputs_text(&mut self, text: String) {
    if let Some(detail) = &mut self.dashboard.detail
      && detail.inputs_text != text
    {
      detail.inputs_text = text;
      self.inputs_dirty = true;
      self.inputs_msg.clear();
      self.inputs_msg_until = None;
    }
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  pub fn language(&self) -> &str {
    self
      .config
      .languages
      .get(self.language_idx)
      .map(String::as_str)
      .unwrap_or("en")
  }

  /// Event rows that match the current filter query.
  pub fn filtered_events(&self) -> Vec<&EventRow> {
    let rows = self.dashboard.events.rows();
    if self.filter.is_empty() {
      return rows.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    rows
      .iter()
      .filter(|row| {
        let haystack = format!("{} {} {}", row.title, row.language, row.status);
        matcher.fuzzy_match(&haystack, &self.filter).is_some()
      })
      .collect()
  }

  /// The row under the list cursor in the filtered view, if any.
  pub fn cursor_event(&self) -> Option<&EventRow> {
    self.filtered_events().get(self.list_cursor).copied()
  }

  fn concept_under_cursor(&self) -> Option<String> {
    self
      .dashboard
      .detail
      .as_ref()
      .and_then(|d| d.concepts.rows().get(self.concept_cursor))
      .map(|c| c.label.clone())
  }

  fn focused_len(&self) -> usize {
    match self.focus {
      Focus::Events => self.filtered_events().len(),
      Focus::Artifacts => self
        .dashboard
        .detail
        .as_ref()
        .map_or(0, |d| d.artifacts.rows().len()),
      Focus::Concepts => self
        .dashboard
        .detail
        .as_ref()
        .map_or(0, |d| d.concepts.rows().len()),
    }
  }

  fn focused_cursor(&mut self) -> &mut usize {
    match self.focus {
      Focus::Events => &mut self.list_cursor,
      Focus::Artifacts => &mut self.artifact_cursor,
      Focus::Concepts => &mut self.concept_cursor,
    }
  }

  fn clamp_list_cursor(&mut self) {
    let len = self.filtered_events().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  pub fn show_alert(&mut self, msg: impl ToString) { self.alert = Some(msg.to_string()); }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event.
  pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Flow::Quit;
    }

    if self.alert.is_some() {
      self.alert = None;
      return Flow::Continue;
    }
    self.status_msg.clear();

    let flow = match self.dashboard.view {
      View::Landing => self.handle_landing_key(key).await,
      View::Dashboard => match self.entry {
        Entry::Filter => self.handle_filter_key(key),
        Entry::NewTitle => self.handle_title_key(key).await,
        Entry::None => self.handle_dashboard_key(key).await,
      },
    };
    self.sync_auth().await;
    flow
  }

  async fn handle_landing_key(&mut self, key: KeyEvent) -> Flow {
    let field = match self.landing_field {
      LandingField::Email => &mut self.email,
      LandingField::Code => &mut self.code,
    };
    match key.code {
      KeyCode::Esc => return Flow::Quit,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.landing_field = match self.landing_field {
          LandingField::Email => LandingField::Code,
          LandingField::Code => LandingField::Email,
        };
      }
      KeyCode::Backspace => {
        field.pop();
      }
      KeyCode::Char(c) => field.push(c),
      KeyCode::Enter => match self.landing_field {
        LandingField::Email => {
          let redirect = self.config.redirect_to.as_deref();
          self.sign_in_msg = match self.sessions.request_magic_link(&self.email, redirect).await {
            prompt @ SignInPrompt::Sent => {
              self.landing_field = LandingField::Code;
              prompt.message()
            }
            prompt => prompt.message(),
          };
        }
        LandingField::Code if self.code.trim().is_empty() => {
          self.sign_in_msg = EMPTY_CODE_MESSAGE.to_string();
        }
        LandingField::Code => {
          self.sign_in_msg = match self.sessions.verify_code(&self.email, &self.code).await {
            Ok(()) => String::new(),
            Err(e) => format!("Error: {e}"),
          };
        }
      },
      _ => {}
    }
    Flow::Continue
  }

  fn handle_filter_key(&mut self, key: KeyEvent) -> Flow {
    match key.code {
      KeyCode::Esc => {
        self.entry = Entry::None;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => self.entry = Entry::None,
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Flow::Continue
  }

  async fn handle_title_key(&mut self, key: KeyEvent) -> Flow {
    match key.code {
      KeyCode::Esc => {
        self.entry = Entry::None;
        self.new_title.clear();
      }
      KeyCode::Enter => {
        self.entry = Entry::None;
        self.create().await;
      }
      KeyCode::Backspace => {
        self.new_title.pop();
      }
      KeyCode::Char(c) => self.new_title.push(c),
      _ => {}
    }
    Flow::Continue
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> Flow {
    match key.code {
      KeyCode::Char('q') => return Flow::Quit,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.focused_len();
        let cursor = self.focused_cursor();
        if *cursor + 1 < len {
          *cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        let cursor = self.focused_cursor();
        *cursor = cursor.saturating_sub(1);
      }
      KeyCode::Tab => self.focus = self.focus.next(),

      KeyCode::Enter => match self.focus {
        Focus::Events => {
          if let Some(id) = self.cursor_event().map(|row| row.id) {
            self.open(id).await;
          }
        }
        Focus::Artifacts => {
          let link = self
            .dashboard
            .detail
            .as_ref()
            .and_then(|d| d.artifacts.rows().get(self.artifact_cursor))
            .map(|a| a.link.clone());
          self.show_link(link);
        }
        Focus::Concepts => {
          let link = self
            .dashboard
            .detail
            .as_ref()
            .and_then(|d| d.concepts.rows().get(self.concept_cursor))
            .map(|c| c.link.clone());
          self.show_link(link);
        }
      },

      // Event list
      KeyCode::Char('n') => {
        self.entry = Entry::NewTitle;
        self.new_title.clear();
      }
      KeyCode::Char('t') => {
        let count = self.config.languages.len().max(1);
        self.language_idx = (self.language_idx + 1) % count;
      }
      KeyCode::Char('/') => {
        self.entry = Entry::Filter;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('r') => self.reload_events().await,

      // Inputs
      KeyCode::Char('e') => {
        if self.dashboard.detail.is_some() {
          return Flow::EditInputs;
        }
        self.show_alert(Error::NoEventOpen);
      }
      KeyCode::Char('s') => self.save().await,

      // Workflow actions
      KeyCode::Char('c') => match self.concept_under_cursor() {
        Some(label) => self.run_action(RemoteAction::SelectConcept { label }).await,
        None if self.backend.is_none() => self.show_alert(Error::BackendNotConfigured),
        None if self.dashboard.current_event.is_none() => self.show_alert(Error::NoEventOpen),
        None => self.status_msg = "No concept under the cursor.".into(),
      },
      KeyCode::Char('f') => self.run_action(RemoteAction::RequestFolder).await,
      KeyCode::Char('g') => self.run_action(RemoteAction::RequestConcepts).await,
      KeyCode::Char('p') => self.run_action(RemoteAction::RequestPacks).await,

      KeyCode::Char('o') => self.sessions.sign_out().await,

      _ => {}
    }
    Flow::Continue
  }

  fn show_link(&mut self, link: Option<Option<String>>) {
    self.status_msg = match link {
      Some(Some(link)) => link,
      Some(None) => "No link yet.".into(),
      None => String::new(),
    };
  }
}
