//! Error type for `planner-supabase`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered with a non-2xx status. `message` is the most
  /// specific text found in the error body.
  #[error("{message}")]
  Api { status: u16, message: String },

  /// A maybe-single read matched more than one row.
  #[error("expected at most one row from {table}, got {count}")]
  MultipleRows { table: &'static str, count: usize },

  /// An insert asked for its row back and got none.
  #[error("{table} insert returned no row")]
  EmptyInsert { table: &'static str },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("input error: {0}")]
  Input(#[from] planner_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
