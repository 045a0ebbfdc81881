//! Core types and trait definitions for Field Notes.
//!
//! This crate is deliberately free of HTTP, EXIF and storage dependencies.
//! Every other crate depends on it: the store backends implement
//! [`store::ObservationStore`], the upstream clients implement the traits in
//! [`source`], and the ingest pipeline ties them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod identification;
pub mod lenient;
pub mod location;
pub mod lookup;
pub mod merge;
pub mod metadata;
pub mod observation;
pub mod source;
pub mod store;

pub use error::{Error, Result};
pub use lookup::Lookup;
pub use observation::Observation;
