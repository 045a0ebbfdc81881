//! Handlers for `/images` and `/analyze`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/images` | Image files without a stored observation, sorted |
//! | `POST` | `/analyze` | Body: `{"imageFile":"a.jpg"}`; returns the analysed observation, unsaved |

use axum::{Json, extract::State};
use fieldnotes_core::{Observation, store::ObservationStore};
use fieldnotes_ingest::{Analyzer, images};
use serde::Deserialize;

use crate::{AppState, error::ApiError, extract::ApiJson};

/// `GET /images`
pub async fn list_images<S, A, W>(
  State(state): State<AppState<S, A, W>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: ObservationStore,
{
  let files = images::list_images(&state.images_dir).await?;
  let pending = state.store.unprocessed(&files).await.map_err(ApiError::store)?;
  Ok(Json(pending))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
  pub image_file: Option<String>,
}

/// `POST /analyze` — body: `{"imageFile":"a.jpg"}`
///
/// Bodies that are not JSON, or whose `imageFile` is not a string, are 400.
/// Runs the full pipeline against the stored record (if any) and returns the
/// result without saving it; the client saves through `POST /observations`.
pub async fn analyze<S, A, W>(
  State(state): State<AppState<S, A, W>>,
  ApiJson(body): ApiJson<AnalyzeBody>,
) -> Result<Json<Observation>, ApiError>
where
  S: ObservationStore,
  A: Analyzer,
{
  let image_file = body
    .image_file
    .filter(|f| !f.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("imageFile is required".into()))?;

  let analyzer = state
    .analyzer
    .as_ref()
    .ok_or_else(|| ApiError::Unavailable("GEMINI_API_KEY is not configured".into()))?;

  let prior = state.store.get(&image_file).await.map_err(ApiError::store)?;
  let observation = analyzer.analyze(&image_file, prior.as_ref()).await?;

  tracing::info!(
    image_file = %image_file,
    common_name = %observation.common_name,
    confidence = observation.confidence,
    "analysed"
  );
  Ok(Json(observation))
}
