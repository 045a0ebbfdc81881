//! Historical weather from the Open-Meteo archive API.

use chrono::{DateTime, NaiveDateTime, Timelike as _, Utc};
use fieldnotes_core::{Lookup, observation::Weather, source::WeatherSource};
use serde::Deserialize;

use crate::{Result, ServiceConfig};

pub const DEFAULT_BASE_URL: &str = "https://archive-api.open-meteo.com";

const HOURLY_VARIABLES: &str =
  "temperature_2m,relative_humidity_2m,precipitation,weather_code,wind_speed_10m";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ArchiveResponse {
  #[serde(default)]
  pub hourly: Option<Hourly>,
}

/// Parallel hourly arrays; any value may be `null`.
#[derive(Debug, Default, Deserialize)]
pub struct Hourly {
  #[serde(default)]
  pub time:                 Vec<String>,
  #[serde(default)]
  pub temperature_2m:       Vec<Option<f64>>,
  #[serde(default)]
  pub relative_humidity_2m: Vec<Option<f64>>,
  #[serde(default)]
  pub precipitation:        Vec<Option<f64>>,
  #[serde(default)]
  pub weather_code:         Vec<Option<i64>>,
  #[serde(default)]
  pub wind_speed_10m:       Vec<Option<f64>>,
}

// ─── Interpretation ──────────────────────────────────────────────────────────

/// WMO weather interpretation codes used by Open-Meteo.
pub fn condition_label(code: i64) -> Option<&'static str> {
  Some(match code {
    0 => "Clear",
    1 => "Mostly Clear",
    2 => "Partly Cloudy",
    3 => "Overcast",
    45 => "Foggy",
    48 => "Depositing Rime Fog",
    51 => "Light Drizzle",
    53 => "Moderate Drizzle",
    55 => "Dense Drizzle",
    61 => "Slight Rain",
    63 => "Moderate Rain",
    65 => "Heavy Rain",
    71 => "Slight Snow",
    73 => "Moderate Snow",
    75 => "Heavy Snow",
    77 => "Snow Grains",
    80 => "Slight Rain Showers",
    81 => "Moderate Rain Showers",
    82 => "Violent Rain Showers",
    85 => "Slight Snow Showers",
    86 => "Heavy Snow Showers",
    95 => "Thunderstorm",
    96 => "Thunderstorm with Hail",
    99 => "Thunderstorm with Heavy Hail",
    _ => return None,
  })
}

/// Index of the first hourly slot whose hour-of-day is `hour`, or 0.
pub fn hour_index(times: &[String], hour: u32) -> usize {
  times
    .iter()
    .position(|t| {
      NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M")
        .map(|dt| dt.hour() == hour)
        .unwrap_or(false)
    })
    .unwrap_or(0)
}

fn at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
  values.get(index).copied().flatten()
}

/// Reduce the hourly arrays to one snapshot for `hour`.
///
/// Falls back to the first slot when no slot matches the hour or when the
/// matched slot has no temperature. Missing numbers read as 0.
pub fn snapshot(hourly: &Hourly, hour: u32) -> Weather {
  let mut index = hour_index(&hourly.time, hour);
  if at(&hourly.temperature_2m, index).is_none() {
    index = 0;
  }

  let label = at(&hourly.weather_code, index).and_then(condition_label);

  Weather {
    temperature:   at(&hourly.temperature_2m, index).unwrap_or(0.0),
    condition:     label.unwrap_or("Unknown").to_owned(),
    humidity:      at(&hourly.relative_humidity_2m, index).unwrap_or(0.0),
    wind_speed:    at(&hourly.wind_speed_10m, index).unwrap_or(0.0),
    precipitation: Some(at(&hourly.precipitation, index).unwrap_or(0.0)),
    description:   label.unwrap_or("Unknown conditions").to_owned(),
    icon:          None,
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the archive endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct WeatherClient {
  client: reqwest::Client,
  config: ServiceConfig,
}

impl WeatherClient {
  pub fn new(config: ServiceConfig) -> Result<Self> {
    Ok(Self { client: config.client()?, config })
  }

  /// `GET /v1/archive` for the single UTC day containing `when`.
  pub async fn lookup(&self, lat: f64, lng: f64, when: DateTime<Utc>) -> Lookup<Weather> {
    let day = when.date_naive().format("%Y-%m-%d").to_string();

    let response = match self
      .client
      .get(self.config.url("/v1/archive"))
      .query(&[
        ("latitude", lat.to_string()),
        ("longitude", lng.to_string()),
        ("start_date", day.clone()),
        ("end_date", day),
        ("hourly", HOURLY_VARIABLES.to_owned()),
      ])
      .send()
      .await
    {
      Ok(r) => r,
      Err(e) => return Lookup::unavailable(format!("weather request failed: {e}")),
    };

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Lookup::unavailable(format!("weather archive → {status}: {body}"));
    }

    let body: ArchiveResponse = match response.json().await {
      Ok(b) => b,
      Err(e) => return Lookup::unavailable(format!("malformed weather response: {e}")),
    };

    match body.hourly {
      Some(hourly) if !hourly.time.is_empty() => {
        let weather = snapshot(&hourly, when.hour());
        tracing::debug!(
          lat, lng, %when,
          condition = %weather.condition,
          temperature = weather.temperature,
          "weather lookup"
        );
        Lookup::Found(weather)
      }
      _ => Lookup::unavailable("weather archive returned no hourly data"),
    }
  }
}

impl WeatherSource for WeatherClient {
  async fn weather_at(&self, lat: f64, lng: f64, at: DateTime<Utc>) -> Lookup<Weather> {
    self.lookup(lat, lng, at).await
  }
}
