//! HTTP-level tests driving the full router in both tenancy modes.

use axum::{
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use jobtrail_store_file::FileStore;
use jobtrail_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, Storage, router};

const SECRET: &str = "test-secret";

async fn multi_tenant() -> AppState {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState::new(Storage::Relational(store), SECRET)
}

fn single_tenant() -> (TempDir, AppState) {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::new(dir.path().join("applications.json"));
  (dir, AppState::new(Storage::File(store), SECRET))
}

async fn send(
  state: &AppState,
  method: Method,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
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

  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn signup(state: &AppState, email: &str) -> String {
  let (status, body) = send(
    state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({"email": email, "password": "correct horse", "name": "Test"})),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["token"].as_str().unwrap().to_owned()
}

// ─── Statuses ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn statuses_lists_the_five_columns_without_auth() {
  let state = multi_tenant().await;
  let (status, body) = send(&state, Method::GET, "/api/statuses", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!(["Applied", "Phone Screen", "Interviewing", "Offer", "Rejected"])
  );
}

// ─── Single-tenant mode ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_interviewing_defaults_round_to_one() {
  let (_dir, state) = single_tenant();
  let (status, body) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"company": "Acme", "role": "Engineer", "status": "Interviewing"})),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["interviewRound"], 1);
  assert_eq!(body["ownerId"], Value::Null);
  assert_eq!(body["source"], "");
}

#[tokio::test]
async fn create_with_unknown_status_falls_back_to_applied() {
  let (_dir, state) = single_tenant();
  let (status, body) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"company": "Acme", "role": "Engineer", "status": "Ghosted"})),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["status"], "Applied");
  assert_eq!(body["interviewRound"], Value::Null);
}

#[tokio::test]
async fn create_without_company_is_bad_request() {
  let (_dir, state) = single_tenant();
  let (status, body) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"role": "Engineer"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("company"));

  let (_, listed) = send(&state, Method::GET, "/api/applications", None, None).await;
  assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
  let (_dir, state) = single_tenant();
  let req = Request::builder()
    .method(Method::POST)
    .uri("/api/applications")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"company\": "))
    .unwrap();
  let resp = router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_then_list_round_trips() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({
      "company": "Acme", "role": "Engineer", "source": "Referral",
      "portalUrl": "https://careers.acme.test", "loginId": "me@example.com",
      "notes": "ping in a week", "appliedDate": "2024-02-03",
    })),
  )
  .await;

  let (status, listed) = send(&state, Method::GET, "/api/applications", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed, json!([created]));
  assert_eq!(created["appliedDate"], "2024-02-03");
}

#[tokio::test]
async fn patch_to_offer_clears_round() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({
      "company": "Acme", "role": "Engineer",
      "status": "Interviewing", "interviewRound": 3,
    })),
  )
  .await;
  assert_eq!(created["interviewRound"], 3);
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (status, updated) =
    send(&state, Method::PATCH, &uri, None, Some(json!({"status": "Offer"}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "Offer");
  assert_eq!(updated["interviewRound"], Value::Null);
  assert_eq!(updated["company"], "Acme");
}

#[tokio::test]
async fn patch_back_to_interviewing_without_round_restarts_at_one() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({
      "company": "Acme", "role": "Engineer",
      "status": "Interviewing", "interviewRound": 3,
    })),
  )
  .await;
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (status, updated) = send(
    &state,
    Method::PATCH,
    &uri,
    None,
    Some(json!({"status": "Interviewing"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["interviewRound"], 1);

  // Without a status the stored round is kept.
  let (_, bumped) =
    send(&state, Method::PATCH, &uri, None, Some(json!({"interviewRound": 2}))).await;
  assert_eq!(bumped["interviewRound"], 2);
  let (_, kept) =
    send(&state, Method::PATCH, &uri, None, Some(json!({"notes": "onsite"}))).await;
  assert_eq!(kept["interviewRound"], 2);
}

#[tokio::test]
async fn patch_without_body_changes_nothing() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"company": "Acme", "role": "Engineer", "notes": "keep me"})),
  )
  .await;
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (status, updated) = send(&state, Method::PATCH, &uri, None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated, created);
}

#[tokio::test]
async fn patch_with_unknown_status_is_bad_request() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"company": "Acme", "role": "Engineer"})),
  )
  .await;
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (status, _) =
    send(&state, Method::PATCH, &uri, None, Some(json!({"status": "Ghosted"}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_unknown_or_malformed_id_is_not_found() {
  let (_dir, state) = single_tenant();
  let missing = format!("/api/applications/{}", uuid::Uuid::new_v4());
  let (status, _) =
    send(&state, Method::PATCH, &missing, None, Some(json!({"notes": "x"}))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &state,
    Method::PATCH,
    "/api/applications/not-an-id",
    None,
    Some(json!({"notes": "x"})),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_is_no_content_then_not_found() {
  let (_dir, state) = single_tenant();
  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"company": "Acme", "role": "Engineer"})),
  )
  .await;
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (status, body) = send(&state, Method::DELETE, &uri, None, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&state, Method::DELETE, &uri, None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accounts_are_unavailable_without_a_database() {
  let (_dir, state) = single_tenant();
  let creds = json!({"email": "a@example.com", "password": "pw"});

  let (status, _) =
    send(&state, Method::POST, "/api/auth/signup", None, Some(creds.clone())).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

  let (status, _) = send(&state, Method::POST, "/api/auth/login", None, Some(creds)).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ─── Multi-tenant mode ───────────────────────────────────────────────────────

#[tokio::test]
async fn applications_require_a_token() {
  let state = multi_tenant().await;

  let (status, _) = send(&state, Method::GET, "/api/applications", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) =
    send(&state, Method::GET, "/api/applications", Some("not.a.jwt"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // Rejected before validation: an invalid body still gets 401.
  let (status, _) = send(
    &state,
    Method::POST,
    "/api/applications",
    None,
    Some(json!({"role": "Engineer"})),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_then_login_issues_working_tokens() {
  let state = multi_tenant().await;
  let signup_token = signup(&state, "a@example.com").await;

  let (status, body) = send(
    &state,
    Method::POST,
    "/api/auth/login",
    None,
    Some(json!({"email": "a@example.com", "password": "correct horse"})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let login_token = body["token"].as_str().unwrap().to_owned();

  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    Some(&signup_token),
    Some(json!({"company": "Acme", "role": "Engineer"})),
  )
  .await;

  let (status, listed) =
    send(&state, Method::GET, "/api/applications", Some(&login_token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listed, json!([created]));
  assert!(created["ownerId"].is_string());
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
  let state = multi_tenant().await;
  signup(&state, "a@example.com").await;

  let (status, _) = send(
    &state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({"email": "a@example.com", "password": "another"})),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_requires_email_and_password() {
  let state = multi_tenant().await;
  let (status, _) = send(
    &state,
    Method::POST,
    "/api/auth/signup",
    None,
    Some(json!({"email": "a@example.com"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
  let state = multi_tenant().await;
  signup(&state, "a@example.com").await;

  for creds in [
    json!({"email": "a@example.com", "password": "wrong"}),
    json!({"email": "nobody@example.com", "password": "correct horse"}),
  ] {
    let (status, body) =
      send(&state, Method::POST, "/api/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
  }
}

#[tokio::test]
async fn other_owners_cannot_see_or_touch_records() {
  let state = multi_tenant().await;
  let alice = signup(&state, "alice@example.com").await;
  let bob = signup(&state, "bob@example.com").await;

  let (_, created) = send(
    &state,
    Method::POST,
    "/api/applications",
    Some(&alice),
    Some(json!({"company": "Acme", "role": "Engineer"})),
  )
  .await;
  let uri = format!("/api/applications/{}", created["id"].as_str().unwrap());

  let (_, bobs) = send(&state, Method::GET, "/api/applications", Some(&bob), None).await;
  assert_eq!(bobs, json!([]));

  let (status, _) = send(
    &state,
    Method::PATCH,
    &uri,
    Some(&bob),
    Some(json!({"company": "Hijacked"})),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&state, Method::DELETE, &uri, Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, alices) = send(&state, Method::GET, "/api/applications", Some(&alice), None).await;
  assert_eq!(alices, json!([created]));
}
