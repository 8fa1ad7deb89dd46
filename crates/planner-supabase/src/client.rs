//! Shared HTTP plumbing for the REST and auth halves of the client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
  /// Project URL, e.g. `https://xyz.supabase.co`.
  pub url:      String,
  /// The public ("anon") API key.
  pub anon_key: String,
}

/// Async HTTP client for a Supabase project.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SupabaseClient {
  http:   Client,
  config: SupabaseConfig,
}

impl SupabaseClient {
  pub fn new(config: SupabaseConfig) -> Result<Self> {
    let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { http, config })
  }

  pub(crate) fn http(&self) -> &Client { &self.http }

  fn base(&self) -> &str { self.config.url.trim_end_matches('/') }

  /// `{url}/rest/v1/{table}`
  pub(crate) fn rest_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{table}", self.base())
  }

  /// `{url}/auth/v1{path}`
  pub(crate) fn auth_url(&self, path: &str) -> String {
    format!("{}/auth/v1{path}", self.base())
  }

  /// Attach the project key and a bearer token.
  pub(crate) fn authorize(&self, req: RequestBuilder, token: &str) -> RequestBuilder {
    req.header("apikey", &self.config.anon_key).bearer_auth(token)
  }

  /// Attach the project key as both key and bearer, for calls made before
  /// there is a user token.
  pub(crate) fn anonymous(&self, req: RequestBuilder) -> RequestBuilder {
    self.authorize(req, &self.config.anon_key)
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// The union of error body shapes used by PostgREST and GoTrue.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
  message:           Option<String>,
  msg:               Option<String>,
  error_description: Option<String>,
  error:             Option<String>,
}

/// Pass 2xx responses through; turn anything else into [`Error::Api`].
pub(crate) async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let text = resp.text().await.unwrap_or_default();
  debug!(%status, body = %text, "supabase request rejected");
  Err(Error::Api {
    status:  status.as_u16(),
    message: error_message(status, &text),
  })
}

/// The most specific human-readable message in an error body.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
  let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
  parsed
    .msg
    .or(parsed.error_description)
    .or(parsed.message)
    .or(parsed.error)
    .or_else(|| {
      let trimmed = body.trim();
      (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
    })
    .unwrap_or_else(|| {
      status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
    })
}
