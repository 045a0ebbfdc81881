//! Error type for `fieldnotes-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid image file name: {0:?}")]
  InvalidFileName(String),

  #[error("image not found: {0}")]
  ImageNotFound(String),

  #[error("I/O error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("identification failed for {file}: {source}")]
  Identify {
    file:   String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("{file} could not be identified: {reason}")]
  Unidentified { file: String, reason: String },

  #[error("identification for {file} rejected: {source}")]
  Invalid {
    file:   String,
    #[source]
    source: fieldnotes_core::Error,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// The model answered, but not with a usable identification. The image is
  /// skipped and stays unprocessed.
  pub fn is_rejection(&self) -> bool {
    matches!(self, Self::Unidentified { .. } | Self::Invalid { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
