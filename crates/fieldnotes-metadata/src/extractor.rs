//! [`ExifExtractor`] — the [`MetadataSource`] used in production.

use std::path::Path;

use chrono::{DateTime, Utc};
use fieldnotes_core::{
  Lookup,
  metadata::{Candidate, ImageMetadata, first_present},
  source::MetadataSource,
};

use crate::{Geocoder, tags};

/// Reads embedded tags and, when coordinates are found and a geocoder is
/// configured, resolves them to an address.
#[derive(Debug, Clone, Default)]
pub struct ExifExtractor {
  geocoder: Option<Geocoder>,
}

impl ExifExtractor {
  pub fn new(geocoder: Option<Geocoder>) -> Self {
    Self { geocoder }
  }

  /// Extract metadata from `path`.
  ///
  /// An unreadable file or one without an EXIF block is `Unavailable`.
  /// Once tags are readable the result is `Found`, with whatever subset of
  /// position, time and address could be recovered.
  pub async fn read(&self, path: &Path) -> Lookup<ImageMetadata> {
    let bytes = match tokio::fs::read(path).await {
      Ok(b) => b,
      Err(e) => return Lookup::unavailable(format!("cannot read {}: {e}", path.display())),
    };

    let exif = match tags::read(&bytes) {
      Ok(exif) => exif,
      Err(e) => {
        tracing::debug!(path = %path.display(), error = %e, "no readable EXIF");
        return Lookup::unavailable(format!("no EXIF data: {e}"));
      }
    };

    let mut metadata = ImageMetadata::default();

    if let Some((lat, lng)) = tags::coordinates(&exif) {
      metadata.latitude = Some(lat);
      metadata.longitude = Some(lng);
    }

    let mut candidates = tags::timestamp_candidates(&exif);
    candidates.push(Candidate::new("FileModified", modified_at(path).await));
    if let Some((source, at)) = first_present(candidates) {
      tracing::debug!(path = %path.display(), source, %at, "capture time");
      metadata.captured_at = Some(at);
    }

    if let (Some((lat, lng)), Some(geocoder)) = (metadata.coordinates(), &self.geocoder) {
      match geocoder.reverse(lat, lng).await {
        Lookup::Found(address) => metadata.address = Some(address),
        Lookup::Unavailable { reason } => {
          tracing::warn!(lat, lng, %reason, "reverse geocode unavailable");
        }
      }
    }

    Lookup::Found(metadata)
  }
}

async fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
  let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
  Some(DateTime::<Utc>::from(modified))
}

impl MetadataSource for ExifExtractor {
  async fn extract(&self, path: &Path) -> Lookup<ImageMetadata> {
    self.read(path).await
  }
}
