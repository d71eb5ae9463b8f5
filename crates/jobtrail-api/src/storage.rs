//! The storage facade: one [`ApplicationStore`] over whichever backend the
//! process was started with.

use std::fmt;

use jobtrail_core::{
  application::{Application, ApplicationPatch, NewApplication},
  store::ApplicationStore,
};
use jobtrail_store_file::FileStore;
use jobtrail_store_sqlite::SqliteStore;
use thiserror::Error;
use uuid::Uuid;

/// Whether records are scoped to authenticated users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenancy {
  /// No accounts; every caller sees the one shared dataset.
  Single,
  /// Every caller is a user and sees only their own records.
  Multi,
}

impl fmt::Display for Tenancy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Single => "single-tenant",
      Self::Multi => "multi-tenant",
    })
  }
}

#[derive(Debug, Error)]
pub enum StorageError {
  #[error(transparent)]
  Sqlite(#[from] jobtrail_store_sqlite::Error),

  #[error(transparent)]
  File(#[from] jobtrail_store_file::Error),
}

/// The active backend, selected once at startup.
pub enum Storage {
  Relational(SqliteStore),
  File(FileStore),
}

impl Storage {
  pub fn tenancy(&self) -> Tenancy {
    match self {
      Self::Relational(_) => Tenancy::Multi,
      Self::File(_) => Tenancy::Single,
    }
  }

  /// The account store, present only with the relational backend.
  pub fn users(&self) -> Option<&SqliteStore> {
    match self {
      Self::Relational(store) => Some(store),
      Self::File(_) => None,
    }
  }

  /// Release the backend's resources.
  pub async fn close(self) -> Result<(), StorageError> {
    match self {
      Self::Relational(store) => store.close().await?,
      Self::File(_) => {}
    }
    Ok(())
  }
}

impl ApplicationStore for Storage {
  type Error = StorageError;

  async fn list(&self, owner: Option<Uuid>) -> Result<Vec<Application>, StorageError> {
    Ok(match self {
      Self::Relational(s) => s.list(owner).await?,
      Self::File(s) => s.list(owner).await?,
    })
  }

  async fn create(
    &self,
    owner: Option<Uuid>,
    draft: NewApplication,
  ) -> Result<Application, StorageError> {
    Ok(match self {
      Self::Relational(s) => s.create(owner, draft).await?,
      Self::File(s) => s.create(owner, draft).await?,
    })
  }

  async fn update(
    &self,
    owner: Option<Uuid>,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> Result<Option<Application>, StorageError> {
    Ok(match self {
      Self::Relational(s) => s.update(owner, id, patch).await?,
      Self::File(s) => s.update(owner, id, patch).await?,
    })
  }

  async fn delete(&self, owner: Option<Uuid>, id: Uuid) -> Result<bool, StorageError> {
    Ok(match self {
      Self::Relational(s) => s.delete(owner, id).await?,
      Self::File(s) => s.delete(owner, id).await?,
    })
  }
}
