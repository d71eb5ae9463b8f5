//! [`FileStore`]: the JSON-document implementation of [`ApplicationStore`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use jobtrail_core::{
  application::{Application, ApplicationPatch, NewApplication, resolve_round},
  store::ApplicationStore,
};
use uuid::Uuid;

use crate::{Error, Result};

/// A store backed by a single JSON array document on disk.
///
/// The whole document is the dataset of one implicit tenant: owner ids are
/// recorded on create but never used to scope reads or writes.
///
/// Every write is a read-modify-write of the entire document with no locking,
/// so two concurrent writers can lose an update. Only use this backend for a
/// single user.
#[derive(Debug, Clone)]
pub struct FileStore {
  path: PathBuf,
}

impl FileStore {
  /// A store for the document at `path`. Nothing is touched on disk until the
  /// first operation.
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  fn io_error(&self, source: std::io::Error) -> Error {
    Error::Io { path: self.path.clone(), source }
  }

  fn json_error(&self, source: serde_json::Error) -> Error {
    Error::Json { path: self.path.clone(), source }
  }

  /// Create the parent directory and an empty document if either is missing.
  async fn ensure_document(&self) -> Result<()> {
    let exists = tokio::fs::try_exists(&self.path)
      .await
      .map_err(|e| self.io_error(e))?;
    if exists {
      return Ok(());
    }

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| self.io_error(e))?;
    }
    tracing::info!(path = %self.path.display(), "creating empty application document");
    self.save(&[]).await
  }

  async fn load(&self) -> Result<Vec<Application>> {
    self.ensure_document().await?;
    let text = tokio::fs::read_to_string(&self.path)
      .await
      .map_err(|e| self.io_error(e))?;
    let mut apps: Vec<Application> =
      serde_json::from_str(&text).map_err(|e| self.json_error(e))?;
    // The document may have been edited by hand; bring every round in line
    // with its status.
    for app in &mut apps {
      app.interview_round = resolve_round(app.status, app.interview_round);
    }
    Ok(apps)
  }

  async fn save(&self, apps: &[Application]) -> Result<()> {
    let text = serde_json::to_string_pretty(apps).map_err(|e| self.json_error(e))?;
    tokio::fs::write(&self.path, text)
      .await
      .map_err(|e| self.io_error(e))
  }
}

// ─── ApplicationStore impl ───────────────────────────────────────────────────

impl ApplicationStore for FileStore {
  type Error = Error;

  async fn list(&self, _owner: Option<Uuid>) -> Result<Vec<Application>> {
    let mut apps = self.load().await?;
    // Later entries were appended later; reverse first so ties stay newest
    // first under the stable sort.
    apps.reverse();
    apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(apps)
  }

  async fn create(
    &self,
    owner: Option<Uuid>,
    mut draft: NewApplication,
  ) -> Result<Application> {
    let mut apps = self.load().await?;

    let now = Utc::now();
    draft.applied_date.get_or_insert_with(|| now.date_naive());
    let app = draft.into_application(Uuid::new_v4(), owner, now);

    apps.push(app.clone());
    self.save(&apps).await?;
    Ok(app)
  }

  async fn update(
    &self,
    _owner: Option<Uuid>,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> Result<Option<Application>> {
    let mut apps = self.load().await?;

    let Some(app) = apps.iter_mut().find(|a| a.id == id) else {
      return Ok(None);
    };
    patch.apply_to(app);
    let updated = app.clone();

    self.save(&apps).await?;
    Ok(Some(updated))
  }

  async fn delete(&self, _owner: Option<Uuid>, id: Uuid) -> Result<bool> {
    let mut apps = self.load().await?;

    let before = apps.len();
    apps.retain(|a| a.id != id);
    if apps.len() == before {
      return Ok(false);
    }

    self.save(&apps).await?;
    Ok(true)
  }
}
