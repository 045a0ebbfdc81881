//! Reverse geocoding against a Nominatim-compatible endpoint.

use fieldnotes_core::Lookup;
use serde::Deserialize;

use crate::{Result, ServiceConfig};

/// Public OpenStreetMap instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
  display_name: Option<String>,
}

/// Async reverse-geocoding client.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct Geocoder {
  client: reqwest::Client,
  config: ServiceConfig,
}

impl Geocoder {
  pub fn new(config: ServiceConfig) -> Result<Self> {
    Ok(Self { client: config.client()?, config })
  }

  /// `GET /reverse?format=json&lat=..&lon=..&zoom=18&addressdetails=1`;
  /// `display_name` becomes the address.
  pub async fn reverse(&self, lat: f64, lng: f64) -> Lookup<String> {
    let response = match self
      .client
      .get(self.config.url("/reverse"))
      .query(&[
        ("format", "json".to_owned()),
        ("lat", lat.to_string()),
        ("lon", lng.to_string()),
        ("zoom", "18".to_owned()),
        ("addressdetails", "1".to_owned()),
      ])
      .send()
      .await
    {
      Ok(r) => r,
      Err(e) => return Lookup::unavailable(format!("reverse geocode request failed: {e}")),
    };

    let status = response.status();
    if !status.is_success() {
      return Lookup::unavailable(format!("reverse geocode → {status}"));
    }

    match response.json::<ReverseResponse>().await {
      Ok(ReverseResponse { display_name: Some(name) }) if !name.trim().is_empty() => {
        tracing::debug!(lat, lng, address = %name, "reverse geocoded");
        Lookup::Found(name)
      }
      Ok(_) => Lookup::unavailable("reverse geocode response has no display_name"),
      Err(e) => Lookup::unavailable(format!("malformed reverse geocode response: {e}")),
    }
  }
}
