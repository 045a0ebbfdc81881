//! Error type for `fieldnotes-identify`.
//!
//! Only transport and configuration problems are errors. A reply the model
//! sent but that could not be understood is a
//! [`fieldnotes_core::Lookup::Unavailable`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("GEMINI_API_KEY is not set")]
  MissingApiKey,

  #[error("model request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model API returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
