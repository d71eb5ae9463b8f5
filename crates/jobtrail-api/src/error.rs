//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  body::HttpBody as _,
  extract::{FromRequest, OptionalFromRequest, Request, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

/// An error returned by an API handler. Every variant is terminal for the
/// request; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("service unavailable: {0}")]
  Unavailable(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<jobtrail_core::Error> for ApiError {
  fn from(e: jobtrail_core::Error) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl From<StorageError> for ApiError {
  fn from(e: StorageError) -> Self { ApiError::Store(Box::new(e)) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

/// [`Json`] whose rejections use the API's `{"error": ...}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `Option<JsonBody<T>>` is `None` for a request with an empty body; any
/// body that is present must be valid JSON.
impl<T, S> OptionalFromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
    if req.body().size_hint().exact() == Some(0) {
      return Ok(None);
    }
    let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
    Ok(Some(JsonBody(value)))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      // Details stay in the log.
      ApiError::Internal(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
