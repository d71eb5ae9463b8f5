//! User accounts. Only the relational backend stores users.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered user. The password hash never leaves the store layer except
/// through [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub name:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::UserStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  /// Argon2 PHC string; hashing happens before the store sees the password.
  pub password_hash: String,
  pub name:          Option<String>,
}

/// What login needs to check a password.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user_id:       Uuid,
  pub password_hash: String,
}
