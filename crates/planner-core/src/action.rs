//! Remote workflow actions and their dispatcher.
//!
//! Each action is a single HTTP POST to the workflow backend keyed by event
//! id. Delivery is fire-and-forget: the response is shown once and never
//! retried or polled. Every invocation carries a fresh idempotency key so the
//! backend can recognise duplicates.
//!
//! | Action | Path | Body |
//! |--------|------|------|
//! | select concept | `/api/events/{id}/select-concept` | `{"label": ...}` |
//! | request folder | `/api/events/{id}/request-folder` | — |
//! | request concepts | `/api/events/{id}/request-concepts` | — |
//! | request packs | `/api/events/{id}/request-packs` | — |

use std::future::Future;

use serde_json::{Value, json};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// One of the backend's workflow actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
  SelectConcept { label: String },
  RequestFolder,
  RequestConcepts,
  RequestPacks,
}

impl RemoteAction {
  /// The last path segment of the endpoint.
  pub fn endpoint(&self) -> &'static str {
    match self {
      Self::SelectConcept { .. } => "select-concept",
      Self::RequestFolder => "request-folder",
      Self::RequestConcepts => "request-concepts",
      Self::RequestPacks => "request-packs",
    }
  }

  /// JSON body, for the actions that send one.
  pub fn body(&self) -> Option<Value> {
    match self {
      Self::SelectConcept { label } => Some(json!({ "label": label })),
      _ => None,
    }
  }

  fn accepted_message(&self) -> &'static str {
    match self {
      Self::SelectConcept { .. } => "Selection queued.",
      Self::RequestFolder => "Folder request sent.",
      Self::RequestConcepts => "Concepts requested.",
      Self::RequestPacks => "Packs requested.",
    }
  }

  fn rejected_prefix(&self) -> &'static str {
    match self {
      Self::SelectConcept { .. } => "Select failed",
      _ => "Request failed",
    }
  }
}

/// A single invocation of an action against one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
  pub event_id:        Uuid,
  pub action:          RemoteAction,
  /// Fresh per invocation; sent as the `Idempotency-Key` header.
  pub idempotency_key: Uuid,
}

impl ActionRequest {
  pub fn new(event_id: Uuid, action: RemoteAction) -> Self {
    Self {
      event_id,
      action,
      idempotency_key: Uuid::new_v4(),
    }
  }

  /// Path relative to the backend base URL.
  pub fn path(&self) -> String {
    format!("/api/events/{}/{}", self.event_id, self.action.endpoint())
  }
}

/// What the backend answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
  pub status: u16,
  /// The response body, if it parsed as JSON.
  pub body:   Option<Value>,
}

impl ActionResponse {
  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

// ─── Backend seam ────────────────────────────────────────────────────────────

/// Transport to the workflow backend.
pub trait WorkflowBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// POST `request` and report the status and best-effort JSON body.
  /// Non-2xx statuses are `Ok`; only transport failures are `Err`.
  fn post_action<'a>(
    &'a self,
    request: &'a ActionRequest,
  ) -> impl Future<Output = Result<ActionResponse, Self::Error>> + Send + 'a;
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// The user-visible result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
  Accepted(&'static str),
  /// The backend answered with a non-2xx status.
  Rejected { message: String, status: u16 },
  /// The request never got an answer.
  Failed(String),
}

impl ActionOutcome {
  pub fn message(&self) -> &str {
    match self {
      Self::Accepted(msg) => msg,
      Self::Rejected { message, .. } | Self::Failed(message) => message,
    }
  }
}

/// Send `action` for the open event.
///
/// Configuration and context are checked before anything is sent: a missing
/// backend yields [`Error::BackendNotConfigured`], a missing event
/// [`Error::NoEventOpen`].
pub async fn dispatch<B: WorkflowBackend>(
  backend: Option<&B>,
  event_id: Option<Uuid>,
  action: RemoteAction,
) -> Result<ActionOutcome> {
  let backend = backend.ok_or(Error::BackendNotConfigured)?;
  let event_id = event_id.ok_or(Error::NoEventOpen)?;

  let request = ActionRequest::new(event_id, action);
  debug!(
    path = %request.path(),
    key = %request.idempotency_key,
    "dispatching workflow action"
  );

  let outcome = match backend.post_action(&request).await {
    Ok(resp) if resp.is_success() => ActionOutcome::Accepted(request.action.accepted_message()),
    Ok(resp) => {
      let body = resp.body.unwrap_or_else(|| json!({}));
      warn!(status = resp.status, %body, "workflow action rejected");
      ActionOutcome::Rejected {
        message: format!("{}: {body}", request.action.rejected_prefix()),
        status:  resp.status,
      }
    }
    Err(e) => {
      warn!(error = %e, "workflow action failed");
      ActionOutcome::Failed(format!("{}: {e}", request.action.rejected_prefix()))
    }
  };
  Ok(outcome)
}
