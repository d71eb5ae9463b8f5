//! [`SqliteStore`]: the SQLite implementation of [`ApplicationStore`] and
//! [`UserStore`].

use std::path::Path;

use jobtrail_core::{
  application::{Application, ApplicationPatch, NewApplication, resolve_round},
  store::{ApplicationStore, UserStore},
  user::{NewUser, User, UserCredentials},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    APPLICATION_COLUMNS, RawApplication, decode_uuid, encode_date, encode_dt,
    encode_uuid, now,
  },
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Jobtrail store backed by a single SQLite file.
///
/// Every application row belongs to at most one user; all reads and writes
/// are guarded by `user_id`, so one tenant can never see or touch another's
/// rows. Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring the schema up to date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing the WAL.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        schema::bootstrap(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ApplicationStore impl ───────────────────────────────────────────────────

impl ApplicationStore for SqliteStore {
  type Error = crate::Error;

  async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Application>> {
    let owner_str = owner.map(encode_uuid);
    let sql = format!(
      "SELECT {APPLICATION_COLUMNS} FROM applications
       WHERE user_id IS ?1
       ORDER BY created_at DESC, rowid DESC"
    );

    let raws: Vec<RawApplication> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawApplication::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApplication::into_application).collect()
  }

  async fn create(
    &self,
    owner: Option<Uuid>,
    draft: NewApplication,
  ) -> Result<Application> {
    let id_str       = encode_uuid(Uuid::new_v4());
    let owner_str    = owner.map(encode_uuid);
    let created_str  = encode_dt(now()?);
    let status_str   = draft.status.as_str();
    let applied_str  = draft.applied_date.map(encode_date);
    let round        = resolve_round(draft.status, draft.interview_round).map(i64::from);
    let NewApplication {
      company,
      role,
      source,
      portal_url,
      login_id,
      login_notes,
      notes,
      ..
    } = draft;
    let sql = format!(
      "INSERT INTO applications (
         id, user_id, company, role, source, portal_url, login_id,
         login_notes, status, notes, applied_date, interview_round, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
       RETURNING {APPLICATION_COLUMNS}"
    );

    let raw: RawApplication = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![
            id_str,
            owner_str,
            company,
            role,
            source,
            portal_url,
            login_id,
            login_notes,
            status_str,
            notes,
            applied_str,
            round,
            created_str,
          ],
          RawApplication::from_row,
        )?)
      })
      .await?;

    raw.into_application()
  }

  async fn update(
    &self,
    owner: Option<Uuid>,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> Result<Option<Application>> {
    let id_str      = encode_uuid(id);
    let owner_str   = owner.map(encode_uuid);
    let status_str  = patch.status.map(|s| s.as_str());
    let applied_str = patch.applied_date.map(encode_date);
    let round       = patch.interview_round.requested().map(i64::from);
    let ApplicationPatch {
      company,
      role,
      source,
      portal_url,
      login_id,
      login_notes,
      notes,
      ..
    } = patch;

    // One statement: every SET expression sees the pre-update row, so the
    // round is decided against the resulting status atomically.
    let sql = format!(
      "UPDATE applications
       SET company         = COALESCE(?3, company),
           role            = COALESCE(?4, role),
           source          = COALESCE(?5, source),
           portal_url      = COALESCE(?6, portal_url),
           login_id        = COALESCE(?7, login_id),
           login_notes     = COALESCE(?8, login_notes),
           status          = COALESCE(?9, status),
           notes           = COALESCE(?10, notes),
           applied_date    = COALESCE(?11, applied_date),
           interview_round = CASE
             WHEN COALESCE(?9, status) = 'Interviewing'
               THEN COALESCE(?12, interview_round, 1)
             ELSE NULL
           END
       WHERE id = ?1 AND user_id IS ?2
       RETURNING {APPLICATION_COLUMNS}"
    );

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![
                id_str,
                owner_str,
                company,
                role,
                source,
                portal_url,
                login_id,
                login_notes,
                status_str,
                notes,
                applied_str,
                round,
              ],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplication::into_application).transpose()
  }

  async fn delete(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let owner_str = owner.map(encode_uuid);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM applications WHERE id = ?1 AND user_id IS ?2",
          rusqlite::params![id_str, owner_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = crate::Error;

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      input.email,
      name:       input.name,
      created_at: now()?,
    };

    let id_str    = encode_uuid(user.user_id);
    let email     = user.email.clone();
    let name      = user.name.clone();
    let at_str    = encode_dt(user.created_at);
    let hash      = input.password_hash;

    let inserted = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO users (id, email, password_hash, name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, hash, name, at_str],
        );
        match result {
          Ok(_) => Ok(true),
          // `email` is the only UNIQUE column besides the random id.
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(inserted.then_some(user))
  }

  async fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> Result<Option<UserCredentials>> {
    let email = email.to_owned();

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, password_hash FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, password_hash)| -> Result<UserCredentials> {
        Ok(UserCredentials { user_id: decode_uuid(&id)?, password_hash })
      })
      .transpose()
  }
}
