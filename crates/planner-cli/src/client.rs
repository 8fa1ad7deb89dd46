//! Async HTTP client for the workflow backend.

use std::time::Duration;

use anyhow::Context;
use planner_core::action::{ActionRequest, ActionResponse, WorkflowBackend};
use reqwest::Client;
use tracing::debug;

/// Connection settings for the workflow backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
  pub base_url: String,
}

/// Posts workflow actions to `{base_url}/api/events/{id}/…`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct BackendClient {
  client: Client,
  config: BackendConfig,
}

impl BackendClient {
  pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }
}

impl WorkflowBackend for BackendClient {
  type Error = reqwest::Error;

  /// `POST {base}/api/events/{id}/{action}`
  async fn post_action(&self, request: &ActionRequest) -> Result<ActionResponse, reqwest::Error> {
    let mut req = self
      .client
      .post(self.url(&request.path()))
      .header("Idempotency-Key", request.idempotency_key.to_string());
    if let Some(body) = request.action.body() {
      req = req.json(&body);
    }

    let resp = req.send().await?;
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    debug!(status, path = %request.path(), "workflow backend answered");

    Ok(ActionResponse {
      status,
      body: serde_json::from_str(&text).ok(),
    })
  }
}
