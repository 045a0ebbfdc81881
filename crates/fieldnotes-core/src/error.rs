//! Error types for `fieldnotes-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A mandatory identification field was absent or blank.
  #[error("identification is missing required field `{0}`")]
  MissingField(&'static str),

  #[error("confidence {0} is outside 0..=100")]
  ConfidenceOutOfRange(u8),

  #[error("observation image file must not be empty")]
  EmptyImageFile,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
