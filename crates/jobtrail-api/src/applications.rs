//! Handlers for `/applications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/applications` | Newest first |
//! | `POST`   | `/applications` | Body: [`ApplicationDraft`]; returns 201 + stored record |
//! | `PATCH`  | `/applications/:id` | Body: [`ApplicationChanges`], empty means no changes; 404 if not visible |
//! | `DELETE` | `/applications/:id` | 204; 404 if not visible |
//!
//! Every handler resolves the [`Owner`] first, so a rejected token never
//! reaches validation or storage.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jobtrail_core::{
  application::Application,
  store::ApplicationStore,
  validate::{self, ApplicationChanges, ApplicationDraft},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Owner,
  error::{ApiError, JsonBody},
};

fn not_found() -> ApiError { ApiError::NotFound("application not found".into()) }

/// Ids are opaque to callers; anything that is not one of ours is simply
/// not found.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| not_found())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /applications`
pub async fn list(
  State(state): State<AppState>,
  Owner(owner): Owner,
) -> Result<Json<Vec<Application>>, ApiError> {
  let apps = state.storage.list(owner).await?;
  Ok(Json(apps))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /applications`: returns 201 + the stored [`Application`].
pub async fn create(
  State(state): State<AppState>,
  Owner(owner): Owner,
  JsonBody(draft): JsonBody<ApplicationDraft>,
) -> Result<impl IntoResponse, ApiError> {
  let input = validate::new_application(draft)?;
  let app = state.storage.create(owner, input).await?;
  tracing::debug!(id = %app.id, status = %app.status, "application created");
  Ok((StatusCode::CREATED, Json(app)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /applications/:id`
pub async fn update(
  State(state): State<AppState>,
  Owner(owner): Owner,
  Path(id): Path<String>,
  changes: Option<JsonBody<ApplicationChanges>>,
) -> Result<Json<Application>, ApiError> {
  let id = parse_id(&id)?;
  let changes = changes.map(|JsonBody(c)| c).unwrap_or_default();
  let patch = validate::application_patch(changes)?;
  let app = state
    .storage
    .update(owner, id, patch)
    .await?
    .ok_or_else(not_found)?;
  Ok(Json(app))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /applications/:id`
pub async fn delete(
  State(state): State<AppState>,
  Owner(owner): Owner,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let id = parse_id(&id)?;
  if state.storage.delete(owner, id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(not_found())
  }
}
