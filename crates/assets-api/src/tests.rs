//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use assets_service::hasher::{CredentialHasher, HashError};
use assets_store_sqlite::SqliteStore;
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

/// Reversible "hash" so tests do not pay for argon2.
struct PlainHasher;

impl CredentialHasher for PlainHasher {
  fn hash(&self, password: &str) -> Result<String, HashError> { Ok(format!("plain:{password}")) }

  fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
    Ok(hash.strip_prefix("plain:") == Some(password))
  }
}

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState::new(
    Arc::new(store),
    Arc::new(PlainHasher),
    SessionTokens::new(b"test-secret", chrono::Duration::hours(1)),
  )
}

async fn send(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  api_router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and return `(user id, token)`.
async fn sign_up(state: &AppState<SqliteStore>, email: &str) -> (String, String) {
  let resp = send(
    state,
    "POST",
    "/users/register",
    None,
    Some(json!({ "email": email, "password": "hunter22" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body = json_body(resp).await;
  (
    body["user"]["id"].as_str().unwrap().to_owned(),
    body["token"].as_str().unwrap().to_owned(),
  )
}

fn insight_body() -> Value {
  json!({
    "type": "INSIGHT",
    "name": "Nice Name",
    "description": "Nice Description",
    "asset_data": { "insight": { "text": "Nice Insight" } },
  })
}

async fn create_insight(state: &AppState<SqliteStore>, token: &str) -> Value {
  let resp = send(state, "POST", "/assets", Some(token), Some(insight_body())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok_and_no_rollback_failures() {
  let state = make_state().await;
  let resp = send(&state, "GET", "/health", None, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await, json!({ "status": "ok", "rollback_failures": 0 }));
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_user_token_and_cookie() {
  let state = make_state().await;
  let resp = send(
    &state,
    "POST",
    "/users/register",
    None,
    Some(json!({ "email": "ann@example.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_owned();
  assert!(cookie.starts_with("session="));
  assert!(cookie.contains("HttpOnly"));

  let body = json_body(resp).await;
  assert_eq!(body["user"]["email"], "ann@example.com");
  assert!(body["user"].get("password_hash").is_none());
  assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_twice_is_a_conflict() {
  let state = make_state().await;
  sign_up(&state, "ann@example.com").await;
  let resp = send(
    &state,
    "POST",
    "/users/register",
    None,
    Some(json!({ "email": "ann@example.com", "password": "other" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_registrations_of_one_email_conflict_instead_of_failing() {
  let state = make_state().await;
  let body = json!({ "email": "ann@example.com", "password": "hunter22" });

  let (a, b) = tokio::join!(
    send(&state, "POST", "/users/register", None, Some(body.clone())),
    send(&state, "POST", "/users/register", None, Some(body)),
  );

  let mut statuses = [a.status(), b.status()];
  statuses.sort();
  assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_service_registrations_of_one_email_conflict() {
  let state = make_state().await;
  let params = || assets_core::params::RegisterUser {
    email:    "ann@example.com".into(),
    password: "hunter22".into(),
  };

  let (a, b) = tokio::join!(state.users.register(params()), state.users.register(params()));

  let conflicts =
    [&a, &b].iter().filter(|r| matches!(r, Err(assets_service::Error::AlreadyExists(_)))).count();
  assert_eq!(conflicts, 1, "{a:?} / {b:?}");
}

#[tokio::test]
async fn register_with_invalid_email_is_bad_request() {
  let state = make_state().await;
  let resp = send(
    &state,
    "POST",
    "/users/register",
    None,
    Some(json!({ "email": "not-an-email", "password": "hunter22" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_the_password() {
  let state = make_state().await;
  sign_up(&state, "ann@example.com").await;

  let ok = send(
    &state,
    "POST",
    "/users/login",
    None,
    Some(json!({ "email": "ann@example.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(ok.status(), StatusCode::OK);
  assert!(ok.headers().contains_key(header::SET_COOKIE));

  let bad = send(
    &state,
    "POST",
    "/users/login",
    None,
    Some(json!({ "email": "ann@example.com", "password": "wrong" })),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

  let unknown = send(
    &state,
    "POST",
    "/users/login",
    None,
    Some(json!({ "email": "bob@example.com", "password": "hunter22" })),
  )
  .await;
  assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

// ── Assets ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn creating_an_asset_requires_a_session() {
  let state = make_state().await;
  let resp = send(&state, "POST", "/assets", None, Some(insight_body())).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let forged = send(&state, "POST", "/assets", Some("not-a-jwt"), Some(insight_body())).await;
  assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_authenticates_too() {
  let state = make_state().await;
  let (_, token) = sign_up(&state, "ann@example.com").await;

  let req = Request::builder()
    .method("POST")
    .uri("/assets")
    .header(header::CONTENT_TYPE, "application/json")
    .header(header::COOKIE, format!("session={token}"))
    .body(Body::from(insight_body().to_string()))
    .unwrap();
  let resp = api_router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn asset_lifecycle() {
  let state = make_state().await;
  let (_, token) = sign_up(&state, "ann@example.com").await;

  let created = create_insight(&state, &token).await;
  assert_eq!(created["type"], "INSIGHT");
  assert_eq!(created["asset_data"]["insight"]["text"], "Nice Insight");
  let id = created["id"].as_str().unwrap().to_owned();

  let fetched = send(&state, "GET", &format!("/assets/{id}"), None, None).await;
  assert_eq!(fetched.status(), StatusCode::OK);
  assert_eq!(json_body(fetched).await, created);

  let listed = json_body(send(&state, "GET", "/assets", None, None).await).await;
  assert_eq!(listed["assets"].as_array().unwrap().len(), 1);
  assert!(listed["cursor"].is_null());

  let patched = send(
    &state,
    "PATCH",
    &format!("/assets/{id}"),
    Some(&token),
    Some(json!({ "description": "Better Description" })),
  )
  .await;
  assert_eq!(patched.status(), StatusCode::OK);
  let patched = json_body(patched).await;
  assert_eq!(patched["description"], "Better Description");
  assert_eq!(patched["asset_data"], created["asset_data"]);

  let deleted = send(&state, "DELETE", &format!("/assets/{id}"), Some(&token), None).await;
  assert_eq!(deleted.status(), StatusCode::OK);

  let gone = send(&state, "GET", &format!("/assets/{id}"), None, None).await;
  assert_eq!(gone.status(), StatusCode::NOT_FOUND);
  assert!(json_body(gone).await["error"].is_string());
}

#[tokio::test]
async fn listing_pages_with_a_cursor() {
  let state = make_state().await;
  let (_, token) = sign_up(&state, "ann@example.com").await;
  for _ in 0..3 {
    create_insight(&state, &token).await;
  }

  let first = json_body(send(&state, "GET", "/assets?limit=2", None, None).await).await;
  assert_eq!(first["assets"].as_array().unwrap().len(), 2);
  let cursor = first["cursor"].as_str().unwrap().to_owned();

  let second =
    json_body(send(&state, "GET", &format!("/assets?limit=2&cursor={cursor}"), None, None).await)
      .await;
  assert_eq!(second["assets"].as_array().unwrap().len(), 1);
  assert!(second["cursor"].is_null());
}

#[tokio::test]
async fn garbage_cursor_is_bad_request() {
  let state = make_state().await;
  let resp = send(&state, "GET", "/assets?cursor=%25%25%25", None, None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(json_body(resp).await["error"].as_str().unwrap().contains("cursor"));
}

#[tokio::test]
async fn limit_above_maximum_is_bad_request() {
  let state = make_state().await;
  let resp = send(&state, "GET", "/assets?limit=101", None, None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
  let state = make_state().await;
  let (_, token) = sign_up(&state, "ann@example.com").await;

  let bad_path = send(&state, "GET", "/assets/not-a-uuid", None, None).await;
  assert_eq!(bad_path.status(), StatusCode::BAD_REQUEST);

  let bad_type = send(
    &state,
    "POST",
    "/assets",
    Some(&token),
    Some(json!({ "type": "VIDEO", "name": "n", "description": "d" })),
  )
  .await;
  assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);

  let mut empty_name = insight_body();
  empty_name["name"] = json!("");
  let invalid = send(&state, "POST", "/assets", Some(&token), Some(empty_name)).await;
  assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

  let mismatched = send(
    &state,
    "POST",
    "/assets",
    Some(&token),
    Some(json!({
      "type": "CHART",
      "name": "n",
      "description": "d",
      "asset_data": { "insight": { "text": "wrong kind" } },
    })),
  )
  .await;
  assert_eq!(mismatched.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_an_unknown_asset_is_not_found() {
  let state = make_state().await;
  let (_, token) = sign_up(&state, "ann@example.com").await;
  let resp = send(
    &state,
    "PATCH",
    &format!("/assets/{}", uuid::Uuid::new_v4()),
    Some(&token),
    Some(json!({ "description": "x" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Favourites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn favourite_lifecycle() {
  let state = make_state().await;
  let (user_id, token) = sign_up(&state, "ann@example.com").await;
  let asset = create_insight(&state, &token).await;
  let body = json!({ "user_id": user_id, "asset_id": asset["id"] });

  let created = send(&state, "POST", "/favourites", Some(&token), Some(body.clone())).await;
  assert_eq!(created.status(), StatusCode::CREATED);
  let created = json_body(created).await;
  let id = created["id"].as_str().unwrap().to_owned();

  let again = send(&state, "POST", "/favourites", Some(&token), Some(body)).await;
  assert_eq!(again.status(), StatusCode::CONFLICT);

  let listed =
    json_body(send(&state, "GET", &format!("/users/{user_id}/favourites"), None, None).await).await;
  assert_eq!(listed["favourites"], json!([created.clone()]));

  let fetched = send(&state, "GET", &format!("/favourites/{id}"), None, None).await;
  assert_eq!(json_body(fetched).await, created);

  let deleted = send(&state, "DELETE", &format!("/favourites/{id}"), Some(&token), None).await;
  assert_eq!(deleted.status(), StatusCode::OK);

  let gone = send(&state, "GET", &format!("/favourites/{id}"), None, None).await;
  assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favouriting_an_unknown_asset_is_not_found() {
  let state = make_state().await;
  let (user_id, token) = sign_up(&state, "ann@example.com").await;
  let resp = send(
    &state,
    "POST",
    "/favourites",
    Some(&token),
    Some(json!({ "user_id": user_id, "asset_id": uuid::Uuid::new_v4() })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_asset_drops_its_favourites() {
  let state = make_state().await;
  let (user_id, token) = sign_up(&state, "ann@example.com").await;
  let asset = create_insight(&state, &token).await;
  let asset_id = asset["id"].as_str().unwrap();

  let fav = send(
    &state,
    "POST",
    "/favourites",
    Some(&token),
    Some(json!({ "user_id": user_id, "asset_id": asset_id })),
  )
  .await;
  assert_eq!(fav.status(), StatusCode::CREATED);

  let deleted = send(&state, "DELETE", &format!("/assets/{asset_id}"), Some(&token), None).await;
  assert_eq!(deleted.status(), StatusCode::OK);

  let listed =
    json_body(send(&state, "GET", &format!("/users/{user_id}/favourites"), None, None).await).await;
  assert_eq!(listed["favourites"], json!([]));
}
