//! The observation ingestion pipeline.
//!
//! - [`images`] lists the photographs waiting in the images directory.
//! - [`pipeline::Pipeline`] analyses one image: metadata, identification,
//!   validation, weather, merge with any prior record, info card.
//! - [`batch::Orchestrator`] runs the pipeline over many images and saves
//!   the results to an [`fieldnotes_core::store::ObservationStore`].

// Native `async fn` in traits; see `fieldnotes-core`.
#![allow(async_fn_in_trait)]

pub mod batch;
pub mod error;
pub mod images;
pub mod pipeline;
pub mod progress;

pub use batch::{BatchReport, Mode, Orchestrator};
pub use error::{Error, Result};
pub use pipeline::{Analyzer, Pipeline};
pub use progress::ProgressReporter;

#[cfg(test)]
mod tests;
