//! Handlers for `/observations` and `/locations`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/observations` | Optional `?location=<text>`, matched on the normalised key |
//! | `POST` | `/observations` | Body: a full observation; returns `{"observation": …}` |
//! | `GET`  | `/observations/{image_file}` | 404 if not found |
//! | `GET`  | `/locations` | Observations grouped by normalised location |

use axum::{
  Json,
  extract::{Path, State},
};
use fieldnotes_core::{
  Observation,
  location::{LocationGroup, filter_by_location, group_by_location},
  store::ObservationStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub location: Option<String>,
}

/// `GET /observations[?location=<text>]`
pub async fn list<S, A, W>(
  State(state): State<AppState<S, A, W>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Observation>>, ApiError>
where
  S: ObservationStore,
{
  let all = state.store.read_all().await.map_err(ApiError::store)?;
  let observations = match params.location.as_deref().filter(|l| !l.trim().is_empty()) {
    Some(location) => filter_by_location(&all, location).into_iter().cloned().collect(),
    None => all,
  };
  Ok(Json(observations))
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Saved {
  pub observation: Observation,
}

/// `POST /observations` — body: an observation.
///
/// Malformed bodies and out-of-range confidence are 400. `location` is
/// re-derived from `locationData` before the record is stored.
pub async fn save<S, A, W>(
  State(state): State<AppState<S, A, W>>,
  ApiJson(body): ApiJson<Value>,
) -> Result<Json<Saved>, ApiError>
where
  S: ObservationStore,
{
  let observation: Observation = serde_json::from_value(body)
    .map_err(|e| ApiError::BadRequest(format!("invalid observation: {e}")))?;
  let observation = observation.normalized();
  observation
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let observation = state.store.upsert(observation).await.map_err(ApiError::store)?;
  tracing::info!(image_file = %observation.image_file, "observation saved");
  Ok(Json(Saved { observation }))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /observations/{image_file}`
pub async fn get_one<S, A, W>(
  State(state): State<AppState<S, A, W>>,
  Path(image_file): Path<String>,
) -> Result<Json<Observation>, ApiError>
where
  S: ObservationStore,
{
  let observation = state
    .store
    .get(&image_file)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("no observation for {image_file}")))?;
  Ok(Json(observation))
}

// ─── Locations ───────────────────────────────────────────────────────────────

/// `GET /locations`
pub async fn locations<S, A, W>(
  State(state): State<AppState<S, A, W>>,
) -> Result<Json<Vec<LocationGroup>>, ApiError>
where
  S: ObservationStore,
{
  let all = state.store.read_all().await.map_err(ApiError::store)?;
  Ok(Json(group_by_location(&all)))
}
