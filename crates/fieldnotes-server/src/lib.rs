//! Wiring shared by the `fieldnotes-server` and `fieldnotes-analyze` binaries:
//! configuration, client construction and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use fieldnotes_api::AppState;
use fieldnotes_identify::{GeminiClient, GeminiConfig};
use fieldnotes_ingest::{Pipeline, pipeline::PipelineOptions};
use fieldnotes_metadata::{
  ExifExtractor, Geocoder, ServiceConfig, WeatherClient, geocode, weather,
};
use fieldnotes_store_json::JsonStore;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// The analyzer used outside tests.
pub type ProductionPipeline = Pipeline<ExifExtractor, GeminiClient, WeatherClient>;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, from an optional TOML file overlaid with
/// `FIELDNOTES_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub host:                String,
  pub port:                u16,
  pub images_dir:          PathBuf,
  pub store_path:          PathBuf,
  /// Falls back to the `GEMINI_API_KEY` environment variable.
  pub gemini_api_key:      Option<String>,
  pub gemini_base_url:     String,
  pub model:               String,
  pub image_model:         String,
  pub model_timeout_secs:  u64,
  pub reverse_geocode:     bool,
  pub geocode_base_url:    String,
  pub weather_base_url:    String,
  pub lookup_timeout_secs: u64,
  pub fetch_weather:       bool,
  pub generate_info_cards: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".into(),
      port:                3000,
      images_dir:          "images".into(),
      store_path:          "data/observations.json".into(),
      gemini_api_key:      None,
      gemini_base_url:     fieldnotes_identify::gemini::DEFAULT_BASE_URL.into(),
      model:               fieldnotes_identify::gemini::DEFAULT_MODEL.into(),
      image_model:         fieldnotes_identify::gemini::DEFAULT_IMAGE_MODEL.into(),
      model_timeout_secs:  120,
      reverse_geocode:     true,
      geocode_base_url:    geocode::DEFAULT_BASE_URL.into(),
      weather_base_url:    weather::DEFAULT_BASE_URL.into(),
      lookup_timeout_secs: 30,
      fetch_weather:       true,
      generate_info_cards: true,
    }
  }
}

impl AppConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FIELDNOTES"))
      .build()?
      .try_deserialize()?;

    if cfg.gemini_api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
      cfg.gemini_api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Fails with [`fieldnotes_identify::Error::MissingApiKey`] when no key is
  /// configured.
  pub fn gemini(&self) -> fieldnotes_identify::Result<GeminiClient> {
    let key = self
      .gemini_api_key
      .clone()
      .ok_or(fieldnotes_identify::Error::MissingApiKey)?;
    GeminiClient::new(GeminiConfig {
      api_key:     key,
      base_url:    self.gemini_base_url.clone(),
      model:       self.model.clone(),
      image_model: self.image_model.clone(),
      timeout:     Duration::from_secs(self.model_timeout_secs),
    })
  }

  fn service(&self, base_url: &str) -> ServiceConfig {
    let mut service = ServiceConfig::new(base_url);
    service.timeout = Duration::from_secs(self.lookup_timeout_secs);
    service
  }

  pub fn weather_client(&self) -> fieldnotes_metadata::Result<WeatherClient> {
    WeatherClient::new(self.service(&self.weather_base_url))
  }

  pub fn extractor(&self) -> fieldnotes_metadata::Result<ExifExtractor> {
    let geocoder = if self.reverse_geocode {
      Some(Geocoder::new(self.service(&self.geocode_base_url))?)
    } else {
      None
    };
    Ok(ExifExtractor::new(geocoder))
  }

  pub fn pipeline(
    &self,
    gemini: GeminiClient,
  ) -> fieldnotes_metadata::Result<ProductionPipeline> {
    Ok(Pipeline::new(
      &self.images_dir,
      self.extractor()?,
      gemini,
      self.weather_client()?,
      PipelineOptions {
        fetch_weather:       self.fetch_weather,
        generate_info_cards: self.generate_info_cards,
      },
    ))
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// `/api/*` plus the images directory served at `/images`.
pub fn router<A, W>(
  cfg: &AppConfig,
  store: JsonStore,
  analyzer: Option<A>,
  weather: W,
) -> Router
where
  A: fieldnotes_ingest::Analyzer + 'static,
  W: fieldnotes_core::source::WeatherSource + 'static,
{
  let state = AppState {
    store:      Arc::new(store),
    analyzer:   analyzer.map(Arc::new),
    weather:    Arc::new(weather),
    images_dir: Arc::new(cfg.images_dir.clone()),
  };

  Router::new()
    .nest("/api", fieldnotes_api::api_router(state))
    .nest_service("/images", ServeDir::new(&cfg.images_dir))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, Utc};
  use fieldnotes_core::{Lookup, Observation, observation::Weather};
  use tower::ServiceExt as _;

  use super::*;

  struct NoAnalyzer;

  impl fieldnotes_ingest::Analyzer for NoAnalyzer {
    async fn analyze(
      &self,
      image_file: &str,
      _prior: Option<&Observation>,
    ) -> fieldnotes_ingest::Result<Observation> {
      Err(fieldnotes_ingest::Error::ImageNotFound(image_file.into()))
    }
  }

  struct NoWeather;

  impl fieldnotes_core::source::WeatherSource for NoWeather {
    async fn weather_at(
      &self,
      _lat: f64,
      _lng: f64,
      _at: DateTime<Utc>,
    ) -> Lookup<Weather> {
      Lookup::unavailable("offline")
    }
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldnotes.toml");
    std::fs::write(
      &path,
      "port = 8088\nimages_dir = \"photos\"\ngemini_api_key = \"k\"\nfetch_weather = false\n",
    )
    .unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 8088);
    assert_eq!(cfg.images_dir, PathBuf::from("photos"));
    assert_eq!(cfg.store_path, PathBuf::from("data/observations.json"));
    assert!(!cfg.fetch_weather);
    assert!(cfg.generate_info_cards);
    assert_eq!(cfg.model_timeout_secs, 120);
    assert!(cfg.gemini().is_ok());
  }

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.lookup_timeout_secs, 30);
  }

  #[tokio::test]
  async fn serves_api_and_images() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("cep.jpg"), b"jpeg bytes").unwrap();

    let cfg = AppConfig { images_dir: images, ..AppConfig::default() };
    let store = JsonStore::open(dir.path().join("observations.json"));
    let app = router(&cfg, store, Some(NoAnalyzer), NoWeather);

    let resp = app
      .clone()
      .oneshot(Request::get("/images/cep.jpg").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"jpeg bytes");

    let resp = app
      .oneshot(Request::get("/api/images").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let files: Vec<String> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(files, ["cep.jpg"]);
  }
}
