//! Facts recovered from an image file, independent of how they were read.

use chrono::{DateTime, Utc};

use crate::observation::LocationData;

/// GPS position, capture time and (optionally) a reverse-geocoded address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub captured_at: Option<DateTime<Utc>>,
  pub address:     Option<String>,
}

impl ImageMetadata {
  /// Both coordinates, or nothing.
  pub fn coordinates(&self) -> Option<(f64, f64)> {
    self.latitude.zip(self.longitude)
  }

  /// Structured location for the observation, when GPS was recovered.
  pub fn location_data(&self) -> Option<LocationData> {
    self
      .coordinates()
      .map(|(lat, lng)| LocationData::from_coordinates(lat, lng, self.address.clone()))
  }
}

// ─── Precedence ──────────────────────────────────────────────────────────────

/// One entry of a "first present wins" chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
  /// Name of the source, reported alongside the winning value.
  pub source: &'static str,
  pub value:  Option<T>,
}

impl<T> Candidate<T> {
  pub fn new(source: &'static str, value: Option<T>) -> Self {
    Self { source, value }
  }
}

/// Evaluate candidates in order and return the first defined value together
/// with the name of the source it came from.
pub fn first_present<T>(
  candidates: impl IntoIterator<Item = Candidate<T>>,
) -> Option<(&'static str, T)> {
  candidates
    .into_iter()
    .find_map(|c| c.value.map(|v| (c.source, v)))
}
