//! Core types and trait definitions for the Jobtrail application tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement the traits in [`store`]; the API layer depends
//! on those traits and on the validator in [`validate`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod application;
pub mod error;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
