//! The auth gate: bearer-token extractor, token issuing, password hashing.
//!
//! The gate's mode is fixed at startup from the backend's [`Tenancy`]. In
//! single-tenant mode no header is read and every request acts for the
//! implicit tenant (owner `None`). In multi-tenant mode every application
//! request must carry `Authorization: Bearer <jwt>`; the token's subject is
//! the owner id.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError, storage::Tenancy};

/// How long an issued token stays valid, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: String,
  iat: i64,
  exp: i64,
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl TokenKeys {
  pub fn new(secret: &[u8]) -> Self {
    Self {
      encoding:   EncodingKey::from_secret(secret),
      decoding:   DecodingKey::from_secret(secret),
      validation: Validation::new(Algorithm::HS256),
    }
  }

  /// Sign a token for `user_id`, valid for [`TOKEN_TTL_DAYS`].
  pub fn issue(&self, user_id: Uuid) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id.to_string(),
      iat: now.timestamp(),
      exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
  }

  /// Check signature and expiry; return the subject.
  pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|_| invalid_token())?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| invalid_token())
  }
}

fn invalid_token() -> ApiError { ApiError::Unauthorized("invalid token".into()) }

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Resolves the acting owner for each request.
#[derive(Clone)]
pub enum AuthGate {
  SingleTenant,
  MultiTenant(TokenKeys),
}

impl AuthGate {
  pub fn for_tenancy(tenancy: Tenancy, jwt_secret: &str) -> Self {
    match tenancy {
      Tenancy::Single => Self::SingleTenant,
      Tenancy::Multi => Self::MultiTenant(TokenKeys::new(jwt_secret.as_bytes())),
    }
  }

  /// Token keys, present only in multi-tenant mode.
  pub fn keys(&self) -> Option<&TokenKeys> {
    match self {
      Self::SingleTenant => None,
      Self::MultiTenant(keys) => Some(keys),
    }
  }

  /// The owner a request acts for. Multi-tenant requests without a valid
  /// bearer token are rejected here, before any storage access.
  pub fn resolve_owner(&self, headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let keys = match self {
      Self::SingleTenant => return Ok(None),
      Self::MultiTenant(keys) => keys,
    };

    let token = headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .filter(|t| !t.is_empty())
      .ok_or_else(|| ApiError::Unauthorized("missing token".into()))?;

    keys.verify(token).map(Some)
  }
}

/// The acting owner of a request: `None` in single-tenant mode.
pub struct Owner(pub Option<Uuid>);

impl FromRequestParts<AppState> for Owner {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    state.auth.resolve_owner(&parts.headers).map(Owner)
  }
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Whether `password` matches the stored PHC string. A malformed hash never
/// matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}
