//! The `ObservationStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `fieldnotes-store-json`). Higher layers (`fieldnotes-ingest`,
//! `fieldnotes-api`) depend on this abstraction, not on any concrete backend,
//! so the flat file can later become an embedded database without touching
//! callers.

use std::future::Future;

use crate::observation::Observation;

/// Abstraction over an observation store backend.
///
/// Records are keyed by [`Observation::image_file`]. Writes replace whole
/// records; there is no partial patching.
///
/// Backends are not required to serialise concurrent writers. All methods
/// return `Send` futures so the trait can be used in multi-threaded async
/// runtimes (e.g. tokio with `axum`).
pub trait ObservationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every stored record, in store order. An uninitialised store is empty.
  fn read_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + '_;

  /// Replace the record with the same `image_file` in place, or append it.
  /// Returns the record as stored.
  fn upsert(
    &self,
    record: Observation,
  ) -> impl Future<Output = Result<Observation, Self::Error>> + Send + '_;

  /// The members of `image_files` with no stored record: exact,
  /// case-sensitive match; sorted ascending; deduplicated.
  fn unprocessed<'a>(
    &'a self,
    image_files: &'a [String],
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// The record stored for `image_file`, if any.
  fn get<'a>(
    &'a self,
    image_file: &'a str,
  ) -> impl Future<Output = Result<Option<Observation>, Self::Error>> + Send + 'a
  {
    async move {
      Ok(
        self
          .read_all()
          .await?
          .into_iter()
          .find(|o| o.image_file == image_file),
      )
    }
  }
}
