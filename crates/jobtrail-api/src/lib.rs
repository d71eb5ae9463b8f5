//! JSON REST API for Jobtrail.
//!
//! Exposes an axum [`Router`] over a [`Storage`] backend chosen once at
//! startup. Handlers never branch on the backend: the [`Storage`] facade
//! dispatches, and the [`AuthGate`] decides whether callers are scoped by a
//! bearer token.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = jobtrail_api::router(AppState::new(storage, &secret));
//! axum::serve(listener, app).await?;
//! ```

pub mod accounts;
pub mod applications;
pub mod auth;
pub mod error;
pub mod statuses;
pub mod storage;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use auth::AuthGate;
pub use error::ApiError;
pub use storage::{Storage, StorageError, Tenancy};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub storage: Arc<Storage>,
  pub auth:    Arc<AuthGate>,
}

impl AppState {
  /// Wire `storage` to the auth mode its tenancy calls for.
  pub fn new(storage: Storage, jwt_secret: &str) -> Self {
    let auth = AuthGate::for_tenancy(storage.tenancy(), jwt_secret);
    Self {
      storage: Arc::new(storage),
      auth:    Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API routes, relative to the `/api` prefix.
pub fn api_router(state: AppState) -> Router<()> {
  Router::new()
    .route("/statuses", get(statuses::list))
    // Accounts
    .route("/auth/signup", post(accounts::signup))
    .route("/auth/login", post(accounts::login))
    // Applications
    .route(
      "/applications",
      get(applications::list).post(applications::create),
    )
    .route(
      "/applications/{id}",
      patch(applications::update).delete(applications::delete),
    )
    .with_state(state)
}

/// The full HTTP service: the API under `/api`, request tracing, and
/// permissive CORS for a board served from another origin.
pub fn router(state: AppState) -> Router {
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests;
