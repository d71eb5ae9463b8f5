//! jobtrail server binary.
//!
//! Reads `jobtrail.toml` (or the path given with `--config`), picks a storage
//! backend, and serves the JSON API under `/api`.
//!
//! With `database_path` set the server is multi-tenant: records live in
//! SQLite and every request needs a bearer token. Without it, records live
//! in a single JSON file and no accounts exist.

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use jobtrail_api::{AppState, Storage};
use jobtrail_store_file::FileStore;
use jobtrail_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{DEFAULT_JWT_SECRET, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Job application tracker API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "jobtrail.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let storage = open_storage(&cfg).await?;
  tracing::info!(tenancy = %storage.tenancy(), "storage ready");

  let secret = match cfg.jwt_secret() {
    Some(secret) => secret,
    None => {
      if storage.users().is_some() {
        tracing::warn!("jwt_secret is not set; using the built-in development secret");
      }
      DEFAULT_JWT_SECRET
    }
  };

  let state = AppState::new(storage, secret);
  let storage = Arc::clone(&state.storage);
  let app = jobtrail_api::router(state);

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  match Arc::try_unwrap(storage) {
    Ok(storage) => storage.close().await.context("failed to close storage")?,
    Err(_) => tracing::warn!("storage still in use at shutdown; skipping close"),
  }
  tracing::info!("shut down");
  Ok(())
}

async fn open_storage(cfg: &ServerConfig) -> anyhow::Result<Storage> {
  if let Some(path) = cfg.database_path() {
    let path = expand_tilde(path);
    let store = SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open database at {path:?}"))?;
    tracing::info!(path = %path.display(), "using SQLite backend");
    Ok(Storage::Relational(store))
  } else {
    let path = expand_tilde(&cfg.data_file);
    tracing::info!(path = %path.display(), "no database configured; using JSON file backend");
    Ok(Storage::File(FileStore::new(path)))
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
