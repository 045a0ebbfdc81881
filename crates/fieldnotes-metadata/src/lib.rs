//! Image metadata and place/time enrichment for Field Notes.
//!
//! - [`tags`] decodes GPS position and capture time from embedded tags.
//! - [`geocode`] turns coordinates into an address (Nominatim).
//! - [`weather`] looks up historical conditions (Open-Meteo archive).
//! - [`extractor::ExifExtractor`] combines the first two into a
//!   [`fieldnotes_core::source::MetadataSource`].
//!
//! Every lookup degrades to [`fieldnotes_core::Lookup::Unavailable`]; only
//! building an HTTP client can fail.

pub mod error;
pub mod extractor;
pub mod geocode;
pub mod tags;
pub mod weather;

use std::time::Duration;

pub use error::{Error, Result};
pub use extractor::ExifExtractor;
pub use geocode::Geocoder;
pub use weather::WeatherClient;

/// `User-Agent` sent to public services whose usage policy asks for one.
pub const USER_AGENT: &str =
  concat!("FieldNotes/", env!("CARGO_PKG_VERSION"), " (personal field guide)");

/// Connection settings shared by the public lookup services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
  pub base_url:   String,
  pub user_agent: String,
  pub timeout:    Duration,
}

impl ServiceConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url:   base_url.into(),
      user_agent: USER_AGENT.to_owned(),
      timeout:    Duration::from_secs(30),
    }
  }

  fn client(&self) -> Result<reqwest::Client> {
    Ok(
      reqwest::Client::builder()
        .user_agent(&self.user_agent)
        .timeout(self.timeout)
        .build()?,
    )
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }
}
