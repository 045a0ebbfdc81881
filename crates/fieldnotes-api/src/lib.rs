//! JSON REST API for Field Notes.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fieldnotes_core::store::ObservationStore`], an optional
//! [`fieldnotes_ingest::Analyzer`] and a
//! [`fieldnotes_core::source::WeatherSource`]. Static files, TLS and tracing
//! layers are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fieldnotes_api::api_router(state))
//! ```

pub mod analyze;
pub mod error;
pub mod extract;
pub mod observations;
pub mod weather;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use fieldnotes_core::{source::WeatherSource, store::ObservationStore};
use fieldnotes_ingest::Analyzer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, A, W> {
  pub store:      Arc<S>,
  /// `None` when the model is not configured; `/analyze` then answers 503.
  pub analyzer:   Option<Arc<A>>,
  pub weather:    Arc<W>,
  pub images_dir: Arc<PathBuf>,
}

// Manual impl: `derive` would require `S: Clone` etc.
impl<S, A, W> Clone for AppState<S, A, W> {
  fn clone(&self) -> Self {
    Self {
      store:      self.store.clone(),
      analyzer:   self.analyzer.clone(),
      weather:    self.weather.clone(),
      images_dir: self.images_dir.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A, W>(state: AppState<S, A, W>) -> Router<()>
where
  S: ObservationStore + 'static,
  A: Analyzer + 'static,
  W: WeatherSource + 'static,
{
  Router::new()
    // Images
    .route("/images", get(analyze::list_images::<S, A, W>))
    .route("/analyze", post(analyze::analyze::<S, A, W>))
    // Observations
    .route(
      "/observations",
      get(observations::list::<S, A, W>).post(observations::save::<S, A, W>),
    )
    .route("/observations/{image_file}", get(observations::get_one::<S, A, W>))
    .route("/locations", get(observations::locations::<S, A, W>))
    // Weather
    .route("/weather", get(weather::handler::<S, A, W>))
    .with_state(state)
}
