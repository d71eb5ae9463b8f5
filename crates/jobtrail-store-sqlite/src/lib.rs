//! SQLite backend for the Jobtrail application tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements both
//! [`ApplicationStore`](jobtrail_core::store::ApplicationStore) (scoped by
//! owner) and [`UserStore`](jobtrail_core::store::UserStore).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
