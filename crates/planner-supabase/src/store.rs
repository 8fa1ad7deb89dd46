//! [`PlannerStore`] over PostgREST.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list events | `GET /events?owner_id=eq.{id}&order=created_at.desc` |
//! | create event | `POST /events` with `Prefer: return=representation` |
//! | get event | `GET /events?id=eq.{id}`, single-object `Accept` |
//! | get input | `GET /event_inputs?event_id=eq.{id}`, at most one row |
//! | upsert input | `POST /event_inputs?on_conflict=event_id`, merge duplicates |
//! | list artifacts | `GET /artifacts?event_id=eq.{id}&order=created_at.desc` |
//! | list concepts | `GET /concepts?event_id=eq.{id}&order=label.asc` |

use planner_core::{
  artifact::Artifact,
  concept::Concept,
  event::{Event, NewEvent},
  input::EventInput,
  session::Session,
  store::PlannerStore,
};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  client::{SupabaseClient, check},
  encode::{
    ARTIFACT_COLUMNS, CONCEPT_COLUMNS, EVENT_COLUMNS, INPUT_COLUMNS, InputRow, eq,
  },
};

/// Makes PostgREST answer with one object, or an error unless exactly one row matched.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

impl SupabaseClient {
  /// `GET /rest/v1/{table}?select={columns}&{filter}=eq.{id}[&order={order}]`
  async fn select<T: DeserializeOwned>(
    &self,
    session: &Session,
    table: &str,
    columns: &str,
    filter: (&str, Uuid),
    order: Option<&str>,
  ) -> Result<Vec<T>> {
    let mut query = vec![("select", columns.to_string()), (filter.0, eq(filter.1))];
    if let Some(order) = order {
      query.push(("order", order.to_string()));
    }
    debug!(table, filter = filter.0, id = %filter.1, "select");
    let resp = self
      .authorize(self.http().get(self.rest_url(table)), &session.access_token)
      .query(&query)
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }
}

// ─── PlannerStore impl ────────────────────────────────────────────────────────

impl PlannerStore for SupabaseClient {
  type Error = Error;

  async fn list_events(&self, session: &Session, owner_id: Uuid) -> Result<Vec<Event>> {
    self
      .select(
        session,
        "events",
        EVENT_COLUMNS,
        ("owner_id", owner_id),
        Some("created_at.desc"),
      )
      .await
  }

  async fn create_event(&self, session: &Session, event: &NewEvent) -> Result<Event> {
    debug!(title = %event.title, "insert event");
    let resp = self
      .authorize(self.http().post(self.rest_url("events")), &session.access_token)
      .query(&[("select", EVENT_COLUMNS)])
      .header("Prefer", "return=representation")
      .json(event)
      .send()
      .await?;
    let rows: Vec<Event> = check(resp).await?.json().await?;
    rows
      .into_iter()
      .next()
      .ok_or(Error::EmptyInsert { table: "events" })
  }

  async fn get_event(&self, session: &Session, id: Uuid) -> Result<Event> {
    debug!(%id, "select single event");
    let resp = self
      .authorize(self.http().get(self.rest_url("events")), &session.access_token)
      .query(&[("select", EVENT_COLUMNS.to_string()), ("id", eq(id))])
      .header(ACCEPT, SINGLE_OBJECT)
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }

  async fn get_input(&self, session: &Session, event_id: Uuid) -> Result<Option<EventInput>> {
    let mut rows: Vec<InputRow> = self
      .select(
        session,
        "event_inputs",
        INPUT_COLUMNS,
        ("event_id", event_id),
        None,
      )
      .await?;
    match rows.len() {
      0 => Ok(None),
      1 => Ok(rows.pop().map(InputRow::decode)),
      count => Err(Error::MultipleRows {
        table: "event_inputs",
        count,
      }),
    }
  }

  async fn upsert_input(&self, session: &Session, input: &EventInput) -> Result<()> {
    let row = InputRow::encode(input)?;
    debug!(event_id = %row.event_id, version = %row.version, "upsert inputs");
    let resp = self
      .authorize(self.http().post(self.rest_url("event_inputs")), &session.access_token)
      .query(&[("on_conflict", "event_id")])
      .header("Prefer", "resolution=merge-duplicates,return=minimal")
      .json(&row)
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }

  async fn list_artifacts(&self, session: &Session, event_id: Uuid) -> Result<Vec<Artifact>> {
    self
      .select(
        session,
        "artifacts",
        ARTIFACT_COLUMNS,
        ("event_id", event_id),
        Some("created_at.desc"),
      )
      .await
  }

  async fn list_concepts(&self, session: &Session, event_id: Uuid) -> Result<Vec<Concept>> {
    self
      .select(
        session,
        "concepts",
        CONCEPT_COLUMNS,
        ("event_id", event_id),
        Some("label.asc"),
      )
      .await
  }
}
