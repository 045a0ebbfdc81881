//! JSON-file backend for the Field Notes observation store.
//!
//! The whole store is one pretty-printed JSON array. Every write rewrites the
//! file; there is no journal and no locking.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonStore;
