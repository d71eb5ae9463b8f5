//! Application records: the canonical shape every backend returns.
//!
//! An application moves through a fixed set of [`Status`] columns. The only
//! cross-field rule is the interview round: a record carries a round if and
//! only if its status is [`Status::Interviewing`]. [`resolve_round`] is the
//! single place that rule is decided.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Round assigned when a record enters `Interviewing` without a valid round.
pub const DEFAULT_INTERVIEW_ROUND: u32 = 1;

// ─── Status ──────────────────────────────────────────────────────────────────

/// The board column an application sits in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Status {
  #[default]
  Applied,
  #[serde(rename = "Phone Screen")]
  PhoneScreen,
  Interviewing,
  Offer,
  Rejected,
}

impl Status {
  /// Every status, in board order. The first entry is the default.
  pub const ALL: [Status; 5] = [
    Status::Applied,
    Status::PhoneScreen,
    Status::Interviewing,
    Status::Offer,
    Status::Rejected,
  ];

  /// The display string, which is also the wire and column representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Applied => "Applied",
      Self::PhoneScreen => "Phone Screen",
      Self::Interviewing => "Interviewing",
      Self::Offer => "Offer",
      Self::Rejected => "Rejected",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::InvalidStatus(s.to_owned()))
  }
}

/// The round a record with `status` must carry, given a candidate round.
///
/// Non-interviewing records never carry a round. Interviewing records always
/// do; a missing or non-positive candidate becomes
/// [`DEFAULT_INTERVIEW_ROUND`].
pub fn resolve_round(status: Status, candidate: Option<u32>) -> Option<u32> {
  match status {
    Status::Interviewing => Some(
      candidate
        .filter(|round| *round >= 1)
        .unwrap_or(DEFAULT_INTERVIEW_ROUND),
    ),
    _ => None,
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Parse a calendar date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps
/// (the date part is kept).
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .or_else(|_| {
      DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive())
    })
    .map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// `appliedDate` is rendered as `""` when absent rather than `null`.
mod applied_date {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match date {
      Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
      None => serializer.serialize_str(""),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    raw
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(super::parse_date)
      .transpose()
      .map_err(D::Error::custom)
  }
}

/// Stored documents may carry `null` where a string belongs, a status this
/// build does not know, or a round that is not a whole number. Each reads as
/// the field's default.
mod lenient {
  use serde::{Deserialize, Deserializer};

  use super::Status;

  pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
  }

  pub fn status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Status, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(
      raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default(),
    )
  }

  pub fn round<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(
      raw
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|r| u32::try_from(r).ok()),
    )
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// A job application as returned to every caller, whatever the backend.
///
/// Optional text fields are empty strings, never `null`. `owner_id` is `None`
/// in single-tenant mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
  pub id:              Uuid,
  #[serde(default)]
  pub owner_id:        Option<Uuid>,
  pub company:         String,
  pub role:            String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub source:          String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub portal_url:      String,
  /// A login identifier only; credentials are never stored.
  #[serde(default, deserialize_with = "lenient::text")]
  pub login_id:        String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub login_notes:     String,
  #[serde(default, deserialize_with = "lenient::status")]
  pub status:          Status,
  #[serde(default, deserialize_with = "lenient::text")]
  pub notes:           String,
  #[serde(default, with = "applied_date")]
  pub applied_date:    Option<NaiveDate>,
  #[serde(default, deserialize_with = "lenient::round")]
  pub interview_round: Option<u32>,
  /// Server-assigned; never changes after creation.
  pub created_at:      DateTime<Utc>,
}

// ─── NewApplication ──────────────────────────────────────────────────────────

/// A validated create payload. Produced by
/// [`validate::new_application`](crate::validate::new_application); `id` and
/// `created_at` are always assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
  pub company:         String,
  pub role:            String,
  pub source:          String,
  pub portal_url:      String,
  pub login_id:        String,
  pub login_notes:     String,
  pub status:          Status,
  pub notes:           String,
  pub applied_date:    Option<NaiveDate>,
  pub interview_round: Option<u32>,
}

impl NewApplication {
  /// Convenience constructor with every optional field at its default.
  pub fn new(company: impl Into<String>, role: impl Into<String>) -> Self {
    Self {
      company:         company.into(),
      role:            role.into(),
      source:          String::new(),
      portal_url:      String::new(),
      login_id:        String::new(),
      login_notes:     String::new(),
      status:          Status::default(),
      notes:           String::new(),
      applied_date:    None,
      interview_round: None,
    }
  }

  /// Set the status and bring the round in line with it.
  pub fn with_status(mut self, status: Status, round: Option<u32>) -> Self {
    self.status = status;
    self.interview_round = resolve_round(status, round);
    self
  }

  /// Build the stored record.
  pub fn into_application(
    self,
    id: Uuid,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
  ) -> Application {
    Application {
      id,
      owner_id,
      interview_round: resolve_round(self.status, self.interview_round),
      company: self.company,
      role: self.role,
      source: self.source,
      portal_url: self.portal_url,
      login_id: self.login_id,
      login_notes: self.login_notes,
      status: self.status,
      notes: self.notes,
      applied_date: self.applied_date,
      created_at,
    }
  }
}

// ─── ApplicationPatch ────────────────────────────────────────────────────────

/// What a patch does to the interview round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundUpdate {
  /// Leave the stored round alone (still subject to [`resolve_round`]).
  #[default]
  Keep,
  /// Use this round if the resulting status is `Interviewing`.
  Set(u32),
  /// Drop the round; the patch moves the record out of `Interviewing`.
  Clear,
}

impl RoundUpdate {
  /// The explicitly requested round, if any.
  pub fn requested(self) -> Option<u32> {
    match self {
      Self::Set(round) => Some(round),
      Self::Keep | Self::Clear => None,
    }
  }
}

/// A validated partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
  pub company:         Option<String>,
  pub role:            Option<String>,
  pub source:          Option<String>,
  pub portal_url:      Option<String>,
  pub login_id:        Option<String>,
  pub login_notes:     Option<String>,
  pub status:          Option<Status>,
  pub notes:           Option<String>,
  pub applied_date:    Option<NaiveDate>,
  pub interview_round: RoundUpdate,
}

impl ApplicationPatch {
  /// Merge this patch into `app` in place. `id`, `owner_id` and
  /// `created_at` are never touched.
  pub fn apply_to(&self, app: &mut Application) {
    fn merge(slot: &mut String, value: &Option<String>) {
      if let Some(v) = value {
        slot.clone_from(v);
      }
    }

    merge(&mut app.company, &self.company);
    merge(&mut app.role, &self.role);
    merge(&mut app.source, &self.source);
    merge(&mut app.portal_url, &self.portal_url);
    merge(&mut app.login_id, &self.login_id);
    merge(&mut app.login_notes, &self.login_notes);
    merge(&mut app.notes, &self.notes);
    if let Some(status) = self.status {
      app.status = status;
    }
    if let Some(date) = self.applied_date {
      app.applied_date = Some(date);
    }

    let candidate = match self.interview_round {
      RoundUpdate::Keep => app.interview_round,
      RoundUpdate::Set(round) => Some(round),
      RoundUpdate::Clear => None,
    };
    app.interview_round = resolve_round(app.status, candidate);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(status: Status, round: Option<u32>) -> Application {
    NewApplication::new("Acme", "Engineer")
      .with_status(status, round)
      .into_application(Uuid::new_v4(), None, Utc::now())
  }

  #[test]
  fn status_strings_round_trip_through_from_str() {
    for status in Status::ALL {
      assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
    }
    assert!("Ghosted".parse::<Status>().is_err());
    assert!("phone screen".parse::<Status>().is_err());
  }

  #[test]
  fn status_serialises_as_display_string() {
    let json = serde_json::to_string(&Status::PhoneScreen).unwrap();
    assert_eq!(json, "\"Phone Screen\"");
  }

  #[test]
  fn resolve_round_follows_status() {
    assert_eq!(resolve_round(Status::Interviewing, None), Some(1));
    assert_eq!(resolve_round(Status::Interviewing, Some(0)), Some(1));
    assert_eq!(resolve_round(Status::Interviewing, Some(4)), Some(4));
    assert_eq!(resolve_round(Status::Offer, Some(4)), None);
    assert_eq!(resolve_round(Status::Applied, None), None);
  }

  #[test]
  fn parse_date_accepts_date_and_timestamp() {
    let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(parse_date("2024-03-09").unwrap(), expected);
    assert_eq!(parse_date("2024-03-09T10:00:00Z").unwrap(), expected);
    assert!(matches!(parse_date("yesterday"), Err(Error::InvalidDate(_))));
  }

  #[test]
  fn application_wire_shape_is_camel_case_with_empty_date() {
    let app = record(Status::Applied, None);
    let json = serde_json::to_value(&app).unwrap();
    assert_eq!(json["appliedDate"], "");
    assert_eq!(json["interviewRound"], serde_json::Value::Null);
    assert_eq!(json["ownerId"], serde_json::Value::Null);
    assert_eq!(json["portalUrl"], "");
    assert_eq!(json["status"], "Applied");
  }

  #[test]
  fn application_tolerates_missing_optional_fields() {
    let json = serde_json::json!({
      "id": Uuid::new_v4(),
      "company": "Acme",
      "role": "Engineer",
      "appliedDate": "2024-01-02",
      "createdAt": "2024-01-02T03:04:05Z",
    });
    let app: Application = serde_json::from_value(json).unwrap();
    assert_eq!(app.status, Status::Applied);
    assert_eq!(app.source, "");
    assert_eq!(app.applied_date, NaiveDate::from_ymd_opt(2024, 1, 2));
  }

  #[test]
  fn application_reads_nulls_and_unknown_status_as_defaults() {
    let json = serde_json::json!({
      "id": Uuid::new_v4(),
      "company": "Acme",
      "role": "Engineer",
      "source": null,
      "portalUrl": null,
      "loginId": null,
      "loginNotes": null,
      "notes": null,
      "status": "Ghosted",
      "appliedDate": null,
      "interviewRound": "two",
      "createdAt": "2024-01-02T03:04:05Z",
    });
    let app: Application = serde_json::from_value(json).unwrap();
    assert_eq!(app.notes, "");
    assert_eq!(app.portal_url, "");
    assert_eq!(app.status, Status::Applied);
    assert_eq!(app.applied_date, None);
    assert_eq!(app.interview_round, None);

    let app: Application = serde_json::from_value(serde_json::json!({
      "id": Uuid::new_v4(),
      "company": "Acme",
      "role": "Engineer",
      "status": null,
      "createdAt": "2024-01-02T03:04:05Z",
    }))
    .unwrap();
    assert_eq!(app.status, Status::Applied);
  }

  #[test]
  fn patch_leaving_interviewing_clears_round() {
    let mut app = record(Status::Interviewing, Some(3));
    let patch = ApplicationPatch {
      status: Some(Status::Offer),
      interview_round: RoundUpdate::Clear,
      ..ApplicationPatch::default()
    };
    patch.apply_to(&mut app);
    assert_eq!(app.status, Status::Offer);
    assert_eq!(app.interview_round, None);
  }

  #[test]
  fn patch_without_status_keeps_round() {
    let mut app = record(Status::Interviewing, Some(3));
    let patch = ApplicationPatch {
      notes: Some("went well".into()),
      ..ApplicationPatch::default()
    };
    patch.apply_to(&mut app);
    assert_eq!(app.interview_round, Some(3));
    assert_eq!(app.notes, "went well");
  }

  #[test]
  fn patch_round_is_ignored_outside_interviewing() {
    let mut app = record(Status::Applied, None);
    let patch = ApplicationPatch {
      interview_round: RoundUpdate::Set(2),
      ..ApplicationPatch::default()
    };
    patch.apply_to(&mut app);
    assert_eq!(app.interview_round, None);
  }
}
