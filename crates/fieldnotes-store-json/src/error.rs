//! Error type for `fieldnotes-store-json`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The file exists but is not a JSON array of observations.
  #[error("store file {path} is corrupt: {source}")]
  Corrupt {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid observation: {0}")]
  Invalid(#[from] fieldnotes_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
