//! Flat-file backend for the Jobtrail application tracker.
//!
//! All applications live in one pretty-printed JSON array document. This
//! backend is for single-user development setups: it has no notion of
//! owners and no locking.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileStore;
