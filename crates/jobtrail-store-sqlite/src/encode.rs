//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that ordering by the column text is chronological. Dates are
//! `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.
//!
//! [`RawApplication::into_application`] is the only place a row becomes an
//! [`Application`]; every query goes through it.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use jobtrail_core::application::{Application, Status, parse_date, resolve_round};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time, truncated to what [`encode_dt`] keeps.
pub fn now() -> Result<DateTime<Utc>> { decode_dt(&encode_dt(Utc::now())) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  parse_date(s).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every statement that returns application rows, in
/// the order [`RawApplication::from_row`] reads them.
pub const APPLICATION_COLUMNS: &str = "id, user_id, company, role, source, \
   portal_url, login_id, login_notes, status, notes, applied_date, \
   interview_round, created_at";

/// Raw values read directly from an `applications` row.
pub struct RawApplication {
  pub id:              String,
  pub user_id:         Option<String>,
  pub company:         String,
  pub role:            String,
  pub source:          Option<String>,
  pub portal_url:      Option<String>,
  pub login_id:        Option<String>,
  pub login_notes:     Option<String>,
  pub status:          Option<String>,
  pub notes:           Option<String>,
  pub applied_date:    Option<String>,
  pub interview_round: Option<i64>,
  pub created_at:      String,
}

impl RawApplication {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      user_id:         row.get(1)?,
      company:         row.get(2)?,
      role:            row.get(3)?,
      source:          row.get(4)?,
      portal_url:      row.get(5)?,
      login_id:        row.get(6)?,
      login_notes:     row.get(7)?,
      status:          row.get(8)?,
      notes:           row.get(9)?,
      applied_date:    row.get(10)?,
      interview_round: row.get(11)?,
      created_at:      row.get(12)?,
    })
  }

  /// Normalize a row: `NULL` text becomes `""`, an unreadable status becomes
  /// the default, and the round is brought in line with the status.
  pub fn into_application(self) -> Result<Application> {
    let status = self
      .status
      .as_deref()
      .and_then(|s| s.parse::<Status>().ok())
      .unwrap_or_default();
    let round = self
      .interview_round
      .and_then(|r| u32::try_from(r).ok());

    let applied_date = self
      .applied_date
      .as_deref()
      .filter(|s| !s.is_empty())
      .map(decode_date)
      .transpose()?;

    Ok(Application {
      id: decode_uuid(&self.id)?,
      owner_id: self.user_id.as_deref().map(decode_uuid).transpose()?,
      company: self.company,
      role: self.role,
      source: self.source.unwrap_or_default(),
      portal_url: self.portal_url.unwrap_or_default(),
      login_id: self.login_id.unwrap_or_default(),
      login_notes: self.login_notes.unwrap_or_default(),
      status,
      notes: self.notes.unwrap_or_default(),
      applied_date,
      interview_round: resolve_round(status, round),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
