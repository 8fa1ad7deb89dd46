//! Error types for `planner-core`.
//!
//! Only local failures live here: unparseable input, missing context and
//! missing configuration. Remote failures surface through the associated
//! `Error` types of the traits in [`crate::store`] and [`crate::action`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The inputs document could not be parsed at all.
  #[error("Invalid JSON")]
  InvalidJson(#[source] serde_json::Error),

  #[error("Sign in first.")]
  NotSignedIn,

  #[error("Open an event first.")]
  NoEventOpen,

  #[error("Set BACKEND_URL in the config to use server actions.")]
  BackendNotConfigured,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
