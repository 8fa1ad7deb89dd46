//! Tests for `SupabaseClient` against an in-process axum server that records
//! every request and answers with canned responses.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use axum::{
  Router,
  extract::{Request, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{TimeZone, Utc};
use planner_core::{
  event::NewEvent,
  input::{EventInput, InputPayload},
  session::{Session, SessionCache, User},
  store::{AuthProvider, PlannerStore},
};
use reqwest::StatusCode as ReqwestStatus;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  Error, FileSessionCache, SupabaseClient, SupabaseConfig,
  client::error_message,
  encode::TokenResponse,
};

// ─── Mock server ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Seen {
  method:  String,
  path:    String,
  query:   String,
  headers: HeaderMap,
  body:    String,
}

impl Seen {
  fn header(&self, name: &str) -> &str {
    self
      .headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
  }

  fn json(&self) -> Value { serde_json::from_str(&self.body).unwrap() }
}

#[derive(Clone, Default)]
struct Mock {
  seen:      Arc<Mutex<Vec<Seen>>>,
  responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl Mock {
  fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
    self
      .responses
      .lock()
      .unwrap()
      .insert((method.into(), path.into()), (status, body.to_string()));
  }

  fn last(&self) -> Seen { self.seen.lock().unwrap().last().cloned().unwrap() }
}

async fn handle(State(mock): State<Mock>, req: Request) -> Response {
  let (parts, body) = req.into_parts();
  let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
  let key = (parts.method.to_string(), parts.uri.path().to_string());
  mock.seen.lock().unwrap().push(Seen {
    method:  key.0.clone(),
    path:    key.1.clone(),
    query:   parts.uri.query().unwrap_or_default().to_string(),
    headers: parts.headers,
    body:    String::from_utf8_lossy(&bytes).into_owned(),
  });
  let (status, body) = mock
    .responses
    .lock()
    .unwrap()
    .get(&key)
    .cloned()
    .unwrap_or((404, r#"{"message":"no route"}"#.into()));
  (
    StatusCode::from_u16(status).unwrap(),
    [(header::CONTENT_TYPE, "application/json")],
    body,
  )
    .into_response()
}

async fn serve(mock: Mock) -> SupabaseClient {
  let app = Router::new().fallback(handle).with_state(mock);
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  SupabaseClient::new(SupabaseConfig {
    url:      format!("http://{addr}/"),
    anon_key: "anon-key".into(),
  })
  .unwrap()
}

fn session() -> Session {
  Session {
    access_token:  "user-token".into(),
    refresh_token: "refresh-token".into(),
    token_type:    "bearer".into(),
    expires_at:    None,
    user:          User {
      id:    Uuid::from_u128(7),
      email: Some("ada@example.com".into()),
    },
  }
}

fn event_json(id: Uuid, title: &str, created_at: &str) -> Value {
  json!({
    "id": id,
    "owner_id": Uuid::from_u128(7),
    "title": title,
    "language": "en",
    "status": "draft",
    "drive_folder_link": null,
    "created_at": created_at,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_events_filters_by_owner_and_orders_newest_first() {
  let mock = Mock::default();
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
  mock.reply(
    "GET",
    "/rest/v1/events",
    200,
    json!([
      event_json(a, "Newer", "2025-03-01T10:00:00+00:00"),
      event_json(b, "Older", "2025-01-01T10:00:00+00:00"),
    ]),
  );
  let client = serve(mock.clone()).await;

  let events = client
    .list_events(&session(), Uuid::from_u128(7))
    .await
    .unwrap();
  assert_eq!(events.len(), 2);
  assert_eq!(events[0].id, a);
  assert_eq!(
    events[1].created_at,
    Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
  );

  let seen = mock.last();
  assert_eq!(seen.method, "GET");
  assert!(
    seen
      .query
      .contains(&format!("owner_id=eq.{}", Uuid::from_u128(7))),
    "{}",
    seen.query
  );
  assert!(seen.query.contains("order=created_at.desc"), "{}", seen.query);
  assert!(seen.query.contains("select="), "{}", seen.query);
  assert_eq!(seen.header("apikey"), "anon-key");
  assert_eq!(seen.header("authorization"), "Bearer user-token");
}

#[tokio::test]
async fn list_events_accepts_null_columns() {
  let mock = Mock::default();
  let id = Uuid::new_v4();
  let mut row = event_json(id, "Draft", "2025-03-01T10:00:00+00:00");
  row["status"] = Value::Null;
  row["drive_folder_link"] = Value::Null;
  mock.reply("GET", "/rest/v1/events", 200, json!([row]));
  let client = serve(mock).await;

  let events = client
    .list_events(&session(), Uuid::from_u128(7))
    .await
    .unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].status, "");
}

#[tokio::test]
async fn create_event_posts_insert_body() {
  let mock = Mock::default();
  let id = Uuid::new_v4();
  mock.reply(
    "POST",
    "/rest/v1/events",
    201,
    json!([event_json(id, "Product Launch", "2025-03-01T10:00:00Z")]),
  );
  let client = serve(mock.clone()).await;

  let new_event = NewEvent::new(Uuid::from_u128(7), " Product Launch ", "en");
  let created = client.create_event(&session(), &new_event).await.unwrap();
  assert_eq!(created.id, id);

  let seen = mock.last();
  assert_eq!(seen.header("prefer"), "return=representation");
  assert_eq!(
    seen.json(),
    json!({ "owner_id": Uuid::from_u128(7), "title": "Product Launch", "language": "en" })
  );
}

#[tokio::test]
async fn create_event_surfaces_postgrest_message() {
  let mock = Mock::default();
  mock.reply(
    "POST",
    "/rest/v1/events",
    403,
    json!({
      "code": "42501",
      "message": "new row violates row-level security policy for table \"events\"",
      "details": null,
      "hint": null,
    }),
  );
  let client = serve(mock).await;

  let err = client
    .create_event(&session(), &NewEvent::new(Uuid::new_v4(), "x", "en"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Api { status: 403, .. }));
  assert_eq!(
    err.to_string(),
    "new row violates row-level security policy for table \"events\""
  );
}

#[tokio::test]
async fn get_event_requests_a_single_object() {
  let mock = Mock::default();
  let id = Uuid::new_v4();
  mock.reply(
    "GET",
    "/rest/v1/events",
    200,
    event_json(id, "Gala", "2025-03-01T10:00:00Z"),
  );
  let client = serve(mock.clone()).await;

  let event = client.get_event(&session(), id).await.unwrap();
  assert_eq!(event.title, "Gala");
  let seen = mock.last();
  assert_eq!(seen.header("accept"), "application/vnd.pgrst.object+json");
  assert!(seen.query.contains(&format!("id=eq.{id}")));
}

#[tokio::test]
async fn get_input_distinguishes_none_one_and_many() {
  let mock = Mock::default();
  let client = serve(mock.clone()).await;
  let event_id = Uuid::new_v4();

  mock.reply("GET", "/rest/v1/event_inputs", 200, json!([]));
  assert!(client.get_input(&session(), event_id).await.unwrap().is_none());
  assert!(mock.last().query.contains(&format!("event_id=eq.{event_id}")));

  let row = json!({ "event_id": event_id, "version": "3.1", "payload": { "free": "form" } });
  mock.reply("GET", "/rest/v1/event_inputs", 200, json!([row]));
  let input = client.get_input(&session(), event_id).await.unwrap().unwrap();
  assert_eq!(input.version, "3.1");
  assert!(matches!(input.payload, InputPayload::Generic(_)));

  mock.reply("GET", "/rest/v1/event_inputs", 200, json!([row, row]));
  let err = client.get_input(&session(), event_id).await.unwrap_err();
  assert!(matches!(err, Error::MultipleRows { count: 2, .. }));
}

#[tokio::test]
async fn stored_input_outside_the_schema_is_returned_untyped() {
  let mock = Mock::default();
  let event_id = Uuid::new_v4();
  let payload = json!({ "basics": { "title": "Real data", "expected_attendees": 300 } });
  mock.reply(
    "GET",
    "/rest/v1/event_inputs",
    200,
    json!([{ "event_id": event_id, "version": "1.0", "payload": payload }]),
  );
  let client = serve(mock).await;
  let input = client.get_input(&session(), event_id).await.unwrap().unwrap();
  assert_eq!(input.version, "1.0");
  assert_eq!(input.payload, InputPayload::Generic(payload));
}

#[tokio::test]
async fn upsert_input_merges_on_event_id() {
  let mock = Mock::default();
  mock.reply("POST", "/rest/v1/event_inputs", 201, Value::Null);
  let client = serve(mock.clone()).await;

  let event = planner_core::event::Event {
    id:                Uuid::new_v4(),
    owner_id:          Uuid::from_u128(7),
    title:             "Gala".into(),
    language:          "hu".into(),
    status:            "draft".into(),
    drive_folder_link: None,
    created_at:        Utc::now(),
  };
  let input = EventInput::template(&event);
  client.upsert_input(&session(), &input).await.unwrap();

  let seen = mock.last();
  assert!(seen.query.contains("on_conflict=event_id"), "{}", seen.query);
  assert!(seen.header("prefer").contains("resolution=merge-duplicates"));
  let body = seen.json();
  assert_eq!(body["event_id"], json!(event.id));
  assert_eq!(body["version"], "1.0");
  assert_eq!(body["payload"]["basics"]["language"], "hu");
  assert_eq!(body["payload"]["basics"]["expected_attendees"], 80);
}

#[tokio::test]
async fn listings_use_their_own_order() {
  let mock = Mock::default();
  let event_id = Uuid::new_v4();
  mock.reply(
    "GET",
    "/rest/v1/artifacts",
    200,
    json!([{
      "id": Uuid::new_v4(), "event_id": event_id, "type": "brief",
      "title": null, "drive_web_link": "https://drive/a",
      "created_at": "2025-03-01T10:00:00Z"
    }]),
  );
  mock.reply(
    "GET",
    "/rest/v1/concepts",
    200,
    json!([{
      "id": Uuid::new_v4(), "event_id": event_id, "label": "A",
      "prompt_profile": "classic", "selected": true, "drive_web_link": null,
      "created_at": "2025-03-01T10:00:00Z"
    }]),
  );
  let client = serve(mock.clone()).await;

  let artifacts = client.list_artifacts(&session(), event_id).await.unwrap();
  assert_eq!(artifacts[0].kind, "brief");
  assert!(mock.last().query.contains("order=created_at.desc"));

  let concepts = client.list_concepts(&session(), event_id).await.unwrap();
  assert!(concepts[0].selected);
  assert!(mock.last().query.contains("order=label.asc"));
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn magic_link_posts_email_with_redirect() {
  let mock = Mock::default();
  mock.reply("POST", "/auth/v1/otp", 200, json!({}));
  let client = serve(mock.clone()).await;

  client
    .sign_in_with_otp("ada@example.com", Some("https://planner.example/"))
    .await
    .unwrap();

  let seen = mock.last();
  assert_eq!(seen.json(), json!({ "email": "ada@example.com", "create_user": true }));
  assert!(seen.query.starts_with("redirect_to="), "{}", seen.query);
  assert_eq!(seen.header("apikey"), "anon-key");
  assert_eq!(seen.header("authorization"), "Bearer anon-key");
}

#[tokio::test]
async fn verify_returns_session_with_absolute_expiry() {
  let mock = Mock::default();
  mock.reply(
    "POST",
    "/auth/v1/verify",
    200,
    json!({
      "access_token": "jwt",
      "token_type": "bearer",
      "expires_in": 3600,
      "expires_at": 1_900_000_000,
      "refresh_token": "r1",
      "user": { "id": Uuid::from_u128(7), "email": "ada@example.com", "aud": "authenticated" }
    }),
  );
  let client = serve(mock.clone()).await;

  let session = client.verify_otp("ada@example.com", "123456").await.unwrap();
  assert_eq!(session.access_token, "jwt");
  assert_eq!(session.user.id, Uuid::from_u128(7));
  assert_eq!(session.expires_at.unwrap().timestamp(), 1_900_000_000);
  assert_eq!(
    mock.last().json(),
    json!({ "type": "email", "email": "ada@example.com", "token": "123456" })
  );
}

#[tokio::test]
async fn gotrue_error_message_is_surfaced() {
  let mock = Mock::default();
  mock.reply(
    "POST",
    "/auth/v1/verify",
    403,
    json!({ "code": 403, "error_code": "otp_expired", "msg": "Token has expired or is invalid" }),
  );
  let client = serve(mock).await;
  let err = client.verify_otp("ada@example.com", "000000").await.unwrap_err();
  assert_eq!(err.to_string(), "Token has expired or is invalid");
}

#[tokio::test]
async fn refresh_uses_refresh_grant() {
  let mock = Mock::default();
  mock.reply(
    "POST",
    "/auth/v1/token",
    200,
    json!({
      "access_token": "jwt2", "refresh_token": "r2", "expires_in": 60,
      "user": { "id": Uuid::from_u128(7) }
    }),
  );
  let client = serve(mock.clone()).await;

  let before = Utc::now();
  let session = client.refresh_session("r1").await.unwrap();
  assert_eq!(session.refresh_token, "r2");
  assert!(session.expires_at.unwrap() > before);
  let seen = mock.last();
  assert_eq!(seen.query, "grant_type=refresh_token");
  assert_eq!(seen.json(), json!({ "refresh_token": "r1" }));
}

#[tokio::test]
async fn user_and_logout_carry_user_token() {
  let mock = Mock::default();
  mock.reply(
    "GET",
    "/auth/v1/user",
    200,
    json!({ "id": Uuid::from_u128(7), "email": "ada@example.com", "role": "authenticated" }),
  );
  mock.reply("POST", "/auth/v1/logout", 200, json!({}));
  let client = serve(mock.clone()).await;

  let user = client.get_user("user-token").await.unwrap();
  assert_eq!(user.email.as_deref(), Some("ada@example.com"));
  assert_eq!(mock.last().header("authorization"), "Bearer user-token");

  client.sign_out("user-token").await.unwrap();
  assert_eq!(mock.last().path, "/auth/v1/logout");
  assert_eq!(mock.last().header("authorization"), "Bearer user-token");
}

// ─── Pure helpers ────────────────────────────────────────────────────────────

#[test]
fn error_message_prefers_specific_fields() {
  let s = ReqwestStatus::BAD_REQUEST;
  assert_eq!(error_message(s, r#"{"msg":"a","message":"b"}"#), "a");
  assert_eq!(
    error_message(s, r#"{"error":"invalid_grant","error_description":"expired"}"#),
    "expired"
  );
  assert_eq!(error_message(s, r#"{"message":"b"}"#), "b");
  assert_eq!(error_message(s, "upstream timeout"), "upstream timeout");
  assert_eq!(error_message(s, ""), "Bad Request");
  assert_eq!(error_message(s, r#"{"unexpected":1}"#), "Bad Request");
}

#[test]
fn token_without_expires_at_uses_expires_in() {
  let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
  let tokens: TokenResponse = serde_json::from_value(json!({
    "access_token": "a", "refresh_token": "r", "expires_in": 120,
    "user": { "id": Uuid::from_u128(1) }
  }))
  .unwrap();
  let session = tokens.into_session(now);
  assert_eq!(session.token_type, "bearer");
  assert_eq!(
    session.expires_at,
    Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 2, 0).unwrap())
  );
}

// ─── Session cache ───────────────────────────────────────────────────────────

#[test]
fn file_cache_round_trips_and_clears() {
  let dir = std::env::temp_dir().join(format!("planner-cache-{}", Uuid::new_v4()));
  let cache = FileSessionCache::new(dir.join("nested").join("session.json"));

  assert!(cache.load().unwrap().is_none());
  cache.clear().unwrap();

  let mut stored = session();
  stored.expires_at = Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
  cache.save(&stored).unwrap();
  assert_eq!(cache.load().unwrap(), Some(stored));

  cache.clear().unwrap();
  assert!(cache.load().unwrap().is_none());
  assert!(!cache.path().exists());
  std::fs::remove_dir_all(&dir).ok();
}
