//! SQL schema for the Jobtrail SQLite store.
//!
//! Executed once when the store is opened. Every statement is idempotent, so
//! reopening an existing database is safe.

use rusqlite::Connection;

/// Base DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    name          TEXT,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS applications (
    id              TEXT PRIMARY KEY,
    user_id         TEXT REFERENCES users(id) ON DELETE CASCADE,
    company         TEXT NOT NULL,
    role            TEXT NOT NULL,
    source          TEXT,
    portal_url      TEXT,
    login_id        TEXT,
    login_notes     TEXT,
    status          TEXT,          -- display string, e.g. 'Phone Screen'
    notes           TEXT,
    applied_date    TEXT,          -- YYYY-MM-DD or NULL
    interview_round INTEGER,       -- non-NULL iff status = 'Interviewing'
    created_at      TEXT NOT NULL  -- RFC 3339 UTC, fixed width
);
";

/// Columns added after the first release. Databases created before them get
/// the column on open.
const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
  ("portal_url", "TEXT"),
  ("login_id", "TEXT"),
  ("login_notes", "TEXT"),
];

/// Indexes are created after the column guards so they never reference a
/// missing column.
const INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
CREATE INDEX IF NOT EXISTS idx_apps_user   ON applications(user_id);
";

/// Bring `conn` up to the current schema.
pub fn bootstrap(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(SCHEMA)?;

  let existing = {
    let mut stmt =
      conn.prepare("SELECT name FROM pragma_table_info('applications')")?;
    stmt
      .query_map([], |row| row.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  for (column, ty) in ADDITIVE_COLUMNS {
    if !existing.iter().any(|name| name == column) {
      tracing::info!(column, "adding missing applications column");
      conn.execute_batch(&format!(
        "ALTER TABLE applications ADD COLUMN {column} {ty};"
      ))?;
    }
  }

  conn.execute_batch(INDEXES)
}
