//! The storage traits.
//!
//! [`ApplicationStore`] is implemented by every backend (`jobtrail-store-sqlite`,
//! `jobtrail-store-file`). [`UserStore`] is implemented only by backends that
//! can hold accounts. Higher layers depend on these abstractions, not on any
//! concrete backend.
//!
//! Every operation takes an owner id. It is `None` in single-tenant mode;
//! backends that scope by owner must never return or touch another owner's
//! records.

use std::future::Future;

use uuid::Uuid;

use crate::{
  application::{Application, ApplicationPatch, NewApplication},
  user::{NewUser, User, UserCredentials},
};

/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ApplicationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All applications visible to `owner`, newest first by `created_at`.
  fn list(
    &self,
    owner: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;

  /// Persist a validated draft. The store assigns `id` and `created_at`.
  fn create(
    &self,
    owner: Option<Uuid>,
    draft: NewApplication,
  ) -> impl Future<Output = Result<Application, Self::Error>> + Send + '_;

  /// Apply `patch` to the application `id`. Returns `None` if no such
  /// application is visible to `owner`.
  fn update(
    &self,
    owner: Option<Uuid>,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  /// Remove the application `id`. Returns `true` if a record was removed.
  fn delete(
    &self,
    owner: Option<Uuid>,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Account storage for multi-tenant mode.
pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create a user. Returns `None` if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up the credentials stored for `email`.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;
}
