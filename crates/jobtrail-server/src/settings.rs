//! Server configuration: an optional TOML file overlaid with `JOBTRAIL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Signing secret used when none is configured. Fine for local use only.
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  /// SQLite database file. When unset the server runs single-tenant on
  /// `data_file`.
  pub database_path: Option<PathBuf>,
  pub data_file:     PathBuf,
  pub jwt_secret:    Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          3001,
      database_path: None,
      data_file:     PathBuf::from("data/applications.json"),
      jwt_secret:    None,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists), then apply environment overrides.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("JOBTRAIL"))
      .build()?
      .try_deserialize()
  }

  /// The database path, treating an empty value as unset.
  pub fn database_path(&self) -> Option<&Path> {
    self
      .database_path
      .as_deref()
      .filter(|p| !p.as_os_str().is_empty())
  }

  /// The configured secret, or `None` when the built-in default applies.
  pub fn jwt_secret(&self) -> Option<&str> {
    self.jwt_secret.as_deref().filter(|s| !s.is_empty())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
