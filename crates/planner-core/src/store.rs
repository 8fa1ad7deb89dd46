//! The `PlannerStore` and `AuthProvider` traits.
//!
//! Both are implemented by remote clients (e.g. `planner-supabase`). Higher
//! layers depend on these abstractions, not on any concrete service.
//!
//! Every store call takes the caller's [`Session`] explicitly; the store
//! holds no ambient identity of its own.

use std::future::Future;

use uuid::Uuid;

use crate::{
  artifact::Artifact,
  concept::Concept,
  event::{Event, NewEvent},
  input::EventInput,
  session::{Session, User},
};

// ─── Data store ──────────────────────────────────────────────────────────────

/// Abstraction over the remote table store.
///
/// All methods return `Send` futures so two reads can be joined on a
/// multi-threaded runtime.
pub trait PlannerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Events ────────────────────────────────────────────────────────────

  /// Events owned by `owner_id`, newest first.
  fn list_events<'a>(
    &'a self,
    session: &'a Session,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + 'a;

  /// Insert a new event and return the stored row.
  fn create_event<'a>(
    &'a self,
    session: &'a Session,
    event: &'a NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + 'a;

  /// Fetch exactly one event. A missing row is an error.
  fn get_event<'a>(
    &'a self,
    session: &'a Session,
    id: Uuid,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + 'a;

  // ── Inputs ────────────────────────────────────────────────────────────

  /// The input record for `event_id`, or `None` if none was saved yet.
  fn get_input<'a>(
    &'a self,
    session: &'a Session,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Option<EventInput>, Self::Error>> + Send + 'a;

  /// Insert or replace the input record keyed by `input.event_id`.
  fn upsert_input<'a>(
    &'a self,
    session: &'a Session,
    input: &'a EventInput,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Read-only listings ────────────────────────────────────────────────

  /// Artifacts of `event_id`, newest first.
  fn list_artifacts<'a>(
    &'a self,
    session: &'a Session,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Artifact>, Self::Error>> + Send + 'a;

  /// Concepts of `event_id`, ordered by label.
  fn list_concepts<'a>(
    &'a self,
    session: &'a Session,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Concept>, Self::Error>> + Send + 'a;
}

// ─── Auth ────────────────────────────────────────────────────────────────────

/// Abstraction over the remote passwordless auth service.
pub trait AuthProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Email a magic link (and one-time code) to `email`.
  fn sign_in_with_otp<'a>(
    &'a self,
    email: &'a str,
    redirect_to: Option<&'a str>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Exchange the emailed one-time code for a session.
  fn verify_otp<'a>(
    &'a self,
    email: &'a str,
    token: &'a str,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  fn refresh_session<'a>(
    &'a self,
    refresh_token: &'a str,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  /// The user an access token belongs to.
  fn get_user<'a>(
    &'a self,
    access_token: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  /// Revoke the session behind `access_token`.
  fn sign_out<'a>(
    &'a self,
    access_token: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
