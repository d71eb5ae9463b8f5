//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: `{email, password, name?}`; 201 `{token}`, 409 on duplicate email |
//! | `POST` | `/auth/login`  | Body: `{email, password}`; 200 `{token}`, 401 on bad credentials |
//!
//! Both answer 503 when the server runs without a relational backend.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jobtrail_core::{store::UserStore, user::NewUser};
use jobtrail_store_sqlite::SqliteStore;
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{TokenKeys, hash_password, verify_password},
  error::{ApiError, JsonBody},
  storage::StorageError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupBody {
  pub email:    Option<String>,
  pub password: Option<String>,
  pub name:     Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
  pub token: String,
}

/// The account store and token keys, or 503 in single-tenant mode.
fn accounts(state: &AppState) -> Result<(&SqliteStore, &TokenKeys), ApiError> {
  state
    .storage
    .users()
    .zip(state.auth.keys())
    .ok_or_else(|| ApiError::Unavailable("database not configured".into()))
}

fn credentials(
  email: Option<String>,
  password: Option<String>,
) -> Result<(String, String), ApiError> {
  email
    .filter(|e| !e.is_empty())
    .zip(password.filter(|p| !p.is_empty()))
    .ok_or_else(|| ApiError::BadRequest("email and password are required".into()))
}

fn invalid_credentials() -> ApiError { ApiError::Unauthorized("invalid credentials".into()) }

// ─── Signup ───────────────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn signup(
  State(state): State<AppState>,
  JsonBody(body): JsonBody<SignupBody>,
) -> Result<impl IntoResponse, ApiError> {
  let (users, keys) = accounts(&state)?;
  let (email, password) = credentials(body.email, body.password)?;

  let input = NewUser {
    email,
    password_hash: hash_password(&password)?,
    name: body.name.filter(|n| !n.is_empty()),
  };
  let user = users
    .create_user(input)
    .await
    .map_err(StorageError::from)?
    .ok_or_else(|| ApiError::Conflict("email already exists".into()))?;

  tracing::info!(user_id = %user.user_id, "user signed up");
  let token = keys.issue(user.user_id)?;
  Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

// ─── Login ────────────────────────────────────────────────────────────────────

/// `POST /auth/login`
pub async fn login(
  State(state): State<AppState>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError> {
  let (users, keys) = accounts(&state)?;
  let (email, password) = credentials(body.email, body.password)?;

  let creds = users
    .find_credentials(&email)
    .await
    .map_err(StorageError::from)?
    .ok_or_else(invalid_credentials)?;

  if !verify_password(&password, &creds.password_hash) {
    return Err(invalid_credentials());
  }

  let token = keys.issue(creds.user_id)?;
  Ok(Json(TokenResponse { token }))
}
