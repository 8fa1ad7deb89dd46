//! Session state and the [`SessionManager`] that owns it.
//!
//! There is exactly one current session value. Every change is published on
//! a [`tokio::sync::watch`] channel together with the [`AuthEvent`] that
//! caused it, so views can re-render whenever the auth state moves.

use std::io;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::AuthProvider;

/// Access tokens this close to expiry (in seconds) are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 30;

// ─── Types ───────────────────────────────────────────────────────────────────

/// The authenticated identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:    Uuid,
  #[serde(default)]
  pub email: Option<String>,
}

/// Tokens issued by the auth service for one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token:  String,
  pub refresh_token: String,
  #[serde(default = "default_token_type")]
  pub token_type:    String,
  /// Absolute expiry of `access_token`, when the service reported one.
  #[serde(default, with = "chrono::serde::ts_seconds_option")]
  pub expires_at:    Option<DateTime<Utc>>,
  pub user:          User,
}

fn default_token_type() -> String { "bearer".to_string() }

impl Session {
  /// Whether the access token should be refreshed before use at `now`.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self
      .expires_at
      .is_some_and(|at| at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now)
  }
}

/// What caused the latest auth state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthEvent {
  /// The state restored at startup, with or without a session.
  #[default]
  InitialSession,
  SignedIn,
  SignedOut,
  TokenRefreshed,
}

/// The value published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
  pub event:   AuthEvent,
  pub session: Option<Session>,
}

/// Outcome of asking for a magic link, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInPrompt {
  /// Nothing was typed; no request was made.
  EmptyEmail,
  /// The request was accepted. Says nothing about whether the address exists.
  Sent,
  Failed(String),
}

impl SignInPrompt {
  pub fn message(&self) -> String {
    match self {
      Self::EmptyEmail => "Enter an email address.".to_string(),
      Self::Sent => "Check your email for the sign-in link.".to_string(),
      Self::Failed(msg) => format!("Error: {msg}"),
    }
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Local persistence for the current session so a restart stays signed in.
pub trait SessionCache: Send + Sync {
  fn load(&self) -> io::Result<Option<Session>>;
  fn save(&self, session: &Session) -> io::Result<()>;
  fn clear(&self) -> io::Result<()>;
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Owns the current session and talks to the auth service on its behalf.
pub struct SessionManager<A, C> {
  pub(crate) auth:  A,
  pub(crate) cache: C,
  state:            watch::Sender<AuthState>,
}

impl<A, C> SessionManager<A, C>
where
  A: AuthProvider,
  C: SessionCache,
{
  pub fn new(auth: A, cache: C) -> Self {
    let (state, _) = watch::channel(AuthState::default());
    Self { auth, cache, state }
  }

  /// Subscribe to auth state changes. The receiver starts at the current
  /// state, marked as seen.
  pub fn subscribe(&self) -> watch::Receiver<AuthState> { self.state.subscribe() }

  /// The current session, if any. Never contacts the auth service.
  pub fn session(&self) -> Option<Session> { self.state.borrow().session.clone() }

  /// Load the cached session at startup, refreshing it if it has expired.
  pub async fn restore(&self) {
    let cached = match self.cache.load() {
      Ok(s) => s,
      Err(e) => {
        warn!(error = %e, "could not read session cache");
        None
      }
    };

    match cached {
      Some(session) if session.is_expired(Utc::now()) => {
        debug!("cached session expired, refreshing");
        match self.auth.refresh_session(&session.refresh_token).await {
          Ok(fresh) => self.publish(AuthEvent::TokenRefreshed, Some(fresh)),
          Err(e) => {
            warn!(error = %e, "refresh of cached session failed");
            self.publish(AuthEvent::InitialSession, None);
          }
        }
      }
      other => self.publish(AuthEvent::InitialSession, other),
    }
  }

  /// Send a passwordless sign-in email to `email`.
  pub async fn request_magic_link(
    &self,
    email: &str,
    redirect_to: Option<&str>,
  ) -> SignInPrompt {
    let email = email.trim();
    if email.is_empty() {
      return SignInPrompt::EmptyEmail;
    }
    match self.auth.sign_in_with_otp(email, redirect_to).await {
      Ok(()) => SignInPrompt::Sent,
      Err(e) => {
        warn!(error = %e, "magic link request failed");
        SignInPrompt::Failed(e.to_string())
      }
    }
  }

  /// Exchange the one-time code from the sign-in email for a session.
  pub async fn verify_code(&self, email: &str, code: &str) -> Result<(), A::Error> {
    let session = self.auth.verify_otp(email.trim(), code.trim()).await?;
    info!(user = %session.user.id, "signed in");
    self.publish(AuthEvent::SignedIn, Some(session));
    Ok(())
  }

  /// The current session, refreshed first if its access token expired.
  ///
  /// A failed refresh ends the session.
  pub async fn access_session(&self) -> Option<Session> {
    let session = self.session()?;
    if !session.is_expired(Utc::now()) {
      return Some(session);
    }
    match self.auth.refresh_session(&session.refresh_token).await {
      Ok(fresh) => {
        debug!("access token refreshed");
        self.publish(AuthEvent::TokenRefreshed, Some(fresh.clone()));
        Some(fresh)
      }
      Err(e) => {
        warn!(error = %e, "token refresh failed, signing out");
        self.publish(AuthEvent::SignedOut, None);
        None
      }
    }
  }

  /// Ask the auth service who the current token belongs to.
  pub async fn current_user(&self) -> Option<User> {
    let session = self.access_session().await?;
    match self.auth.get_user(&session.access_token).await {
      Ok(user) => Some(user),
      Err(e) => {
        warn!(error = %e, "could not fetch current user");
        None
      }
    }
  }

  /// End the session. Remote failures are logged and otherwise ignored; the
  /// local state always ends up signed out.
  pub async fn sign_out(&self) {
    if let Some(session) = self.session()
      && let Err(e) = self.auth.sign_out(&session.access_token).await
    {
      warn!(error = %e, "remote sign-out failed");
    }
    info!("signed out");
    self.publish(AuthEvent::SignedOut, None);
  }

  fn publish(&self, event: AuthEvent, session: Option<Session>) {
    let cached = match &session {
      Some(s) => self.cache.save(s),
      None => self.cache.clear(),
    };
    if let Err(e) = cached {
      warn!(error = %e, "could not update session cache");
    }
    self.state.send_replace(AuthState { event, session });
  }
}
