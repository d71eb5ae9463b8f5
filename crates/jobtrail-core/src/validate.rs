//! Payload validation and normalization, applied identically before every
//! backend.
//!
//! The raw payload types accept what a client may send (any JSON for
//! `status` and `interviewRound`); the functions here turn them into the
//! typed [`NewApplication`] and [`ApplicationPatch`] the stores accept.
//!
//! | Rule | Create | Update |
//! |------|--------|--------|
//! | `company`/`role` | required, non-empty | non-empty if present |
//! | unknown `status` | falls back to `Applied` | rejected |
//! | status `Interviewing` | round = supplied integer or 1 | same |
//! | other explicit status | round cleared | same |

use serde::Deserialize;
use serde_json::Value;

use crate::{
  Error, Result,
  application::{
    ApplicationPatch, DEFAULT_INTERVIEW_ROUND, NewApplication, RoundUpdate,
    Status, parse_date, resolve_round,
  },
};

// ─── Raw payloads ────────────────────────────────────────────────────────────

/// Body of a create request, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDraft {
  pub company:         Option<String>,
  pub role:            Option<String>,
  pub source:          Option<String>,
  pub portal_url:      Option<String>,
  pub login_id:        Option<String>,
  pub login_notes:     Option<String>,
  pub status:          Option<Value>,
  pub notes:           Option<String>,
  pub applied_date:    Option<String>,
  pub interview_round: Option<Value>,
}

/// Body of an update request, before validation. Absent and `null` fields
/// both mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationChanges {
  pub company:         Option<String>,
  pub role:            Option<String>,
  pub source:          Option<String>,
  pub portal_url:      Option<String>,
  pub login_id:        Option<String>,
  pub login_notes:     Option<String>,
  pub status:          Option<Value>,
  pub notes:           Option<String>,
  pub applied_date:    Option<String>,
  pub interview_round: Option<Value>,
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Validate a create payload.
pub fn new_application(draft: ApplicationDraft) -> Result<NewApplication> {
  let company = required(draft.company, "company")?;
  let role = required(draft.role, "role")?;

  let status = draft
    .status
    .as_ref()
    .and_then(Value::as_str)
    .and_then(|s| s.parse::<Status>().ok())
    .unwrap_or_default();
  let round = draft.interview_round.as_ref().and_then(round_from_json);

  Ok(NewApplication {
    company,
    role,
    source: draft.source.unwrap_or_default(),
    portal_url: draft.portal_url.unwrap_or_default(),
    login_id: draft.login_id.unwrap_or_default(),
    login_notes: draft.login_notes.unwrap_or_default(),
    status,
    notes: draft.notes.unwrap_or_default(),
    applied_date: optional_date(draft.applied_date.as_deref())?,
    interview_round: resolve_round(status, round),
  })
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Validate an update payload.
pub fn application_patch(changes: ApplicationChanges) -> Result<ApplicationPatch> {
  let status = explicit_status(changes.status.as_ref())?;
  let round = changes.interview_round.as_ref().and_then(round_from_json);

  let interview_round = match status {
    Some(Status::Interviewing) => {
      RoundUpdate::Set(round.unwrap_or(DEFAULT_INTERVIEW_ROUND))
    }
    Some(_) => RoundUpdate::Clear,
    None => round.map_or(RoundUpdate::Keep, RoundUpdate::Set),
  };

  Ok(ApplicationPatch {
    company: non_empty(changes.company, "company")?,
    role: non_empty(changes.role, "role")?,
    source: changes.source,
    portal_url: changes.portal_url,
    login_id: changes.login_id,
    login_notes: changes.login_notes,
    status,
    notes: changes.notes,
    applied_date: optional_date(changes.applied_date.as_deref())?,
    interview_round,
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn required(value: Option<String>, field: &'static str) -> Result<String> {
  value
    .filter(|v| !v.is_empty())
    .ok_or(Error::MissingField(field))
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<Option<String>> {
  match value {
    Some(v) if v.is_empty() => Err(Error::EmptyField(field)),
    other => Ok(other),
  }
}

/// `null` and `""` count as "no status supplied".
fn explicit_status(value: Option<&Value>) -> Result<Option<Status>> {
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) if s.is_empty() => Ok(None),
    Some(Value::String(s)) => s.parse().map(Some),
    Some(other) => Err(Error::InvalidStatus(other.to_string())),
  }
}

fn optional_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
  raw
    .filter(|s| !s.trim().is_empty())
    .map(parse_date)
    .transpose()
}

/// A positive whole JSON number (`2` or `2.0`); anything else is `None`.
fn round_from_json(value: &Value) -> Option<u32> {
  let Value::Number(n) = value else {
    return None;
  };
  let whole = match n.as_u64() {
    Some(u) => u,
    None => {
      let f = n.as_f64()?;
      if f.fract() != 0.0 || f < 1.0 {
        return None;
      }
      f as u64
    }
  };
  u32::try_from(whole).ok().filter(|round| *round >= 1)
}
