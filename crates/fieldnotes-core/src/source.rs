//! Traits for the upstream collaborators of the ingest pipeline.
//!
//! Implementations live in `fieldnotes-metadata` (EXIF, geocoding, weather)
//! and `fieldnotes-identify` (the generative model). Only transport or
//! configuration problems are errors; "nothing found" is a
//! [`Lookup::Unavailable`].

use std::{future::Future, path::Path};

use chrono::{DateTime, Utc};

use crate::{
  identification::IdentificationDraft,
  lookup::Lookup,
  metadata::ImageMetadata,
  observation::{Observation, Weather},
};

/// Reads GPS position and capture time from an image file.
pub trait MetadataSource: Send + Sync {
  /// Never fails: unreadable tags come back as `Unavailable`.
  fn extract<'a>(
    &'a self,
    path: &'a Path,
  ) -> impl Future<Output = Lookup<ImageMetadata>> + Send + 'a;
}

/// Identifies the subject of a photograph.
pub trait Identifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Ask the model about `image`. An answer that cannot be parsed is
  /// `Ok(Lookup::Unavailable)`.
  fn identify<'a>(
    &'a self,
    image: &'a [u8],
    file_name: &'a str,
  ) -> impl Future<Output = Result<Lookup<IdentificationDraft>, Self::Error>>
  + Send
  + 'a;

  /// Produce a base64 illustrative card for an already-identified record.
  fn info_card<'a>(
    &'a self,
    observation: &'a Observation,
  ) -> impl Future<Output = Lookup<String>> + Send + 'a;
}

/// Historical weather at a place and time.
pub trait WeatherSource: Send + Sync {
  fn weather_at(
    &self,
    lat: f64,
    lng: f64,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Lookup<Weather>> + Send + '_;
}
