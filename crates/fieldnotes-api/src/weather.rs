//! Handler for `GET /weather`.

use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, Utc};
use fieldnotes_core::{Lookup, observation::Weather, source::WeatherSource};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::ApiQuery};

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
  pub lat:  Option<f64>,
  pub lng:  Option<f64>,
  /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` (midnight UTC).
  pub date: Option<String>,
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
    })
}

/// `GET /weather?lat=<f64>&lng=<f64>&date=<timestamp>`
pub async fn handler<S, A, W>(
  State(state): State<AppState<S, A, W>>,
  ApiQuery(params): ApiQuery<WeatherParams>,
) -> Result<Json<Weather>, ApiError>
where
  W: WeatherSource,
{
  let (Some(lat), Some(lng), Some(date)) = (params.lat, params.lng, params.date) else {
    return Err(ApiError::BadRequest("lat, lng, and date are required".into()));
  };
  let at = parse_date(date.trim())
    .ok_or_else(|| ApiError::BadRequest(format!("unparseable date {date:?}")))?;

  match state.weather.weather_at(lat, lng, at).await {
    Lookup::Found(weather) => Ok(Json(weather)),
    Lookup::Unavailable { reason } => {
      tracing::warn!(lat, lng, %at, %reason, "weather unavailable");
      Err(ApiError::BadGateway(format!("weather unavailable: {reason}")))
    }
  }
}
