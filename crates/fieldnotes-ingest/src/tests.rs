//! Pipeline and batch tests with in-memory collaborators and a `JsonStore`
//! in a temporary directory.

use std::{
  collections::HashMap,
  path::Path,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, TimeZone as _, Utc};
use fieldnotes_core::{
  Lookup, Observation,
  identification::IdentificationDraft,
  metadata::ImageMetadata,
  observation::Weather,
  source::{Identifier, MetadataSource, WeatherSource},
  store::ObservationStore,
};
use fieldnotes_store_json::JsonStore;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{
  Analyzer, BatchReport, Error, Mode, Orchestrator, Pipeline,
  pipeline::PipelineOptions,
  progress::{ItemOutcome, Progress, ProgressReporter, SilentReporter},
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeMetadata {
  by_file: HashMap<String, ImageMetadata>,
}

impl MetadataSource for FakeMetadata {
  async fn extract(&self, path: &Path) -> Lookup<ImageMetadata> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match self.by_file.get(name) {
      Some(m) => Lookup::Found(m.clone()),
      None => Lookup::unavailable("no EXIF"),
    }
  }
}

enum Reply {
  Draft(Value),
  Unparseable,
  Down,
}

#[derive(Debug, thiserror::Error)]
#[error("model unreachable")]
struct Unreachable;

#[derive(Default)]
struct FakeIdentifier {
  replies: HashMap<String, Reply>,
  card:    Option<String>,
  calls:   Arc<AtomicUsize>,
}

impl FakeIdentifier {
  fn reply(mut self, file: &str, reply: Reply) -> Self {
    self.replies.insert(file.into(), reply);
    self
  }
}

impl Identifier for FakeIdentifier {
  type Error = Unreachable;

  async fn identify(
    &self,
    _image: &[u8],
    file_name: &str,
  ) -> Result<Lookup<IdentificationDraft>, Unreachable> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    match self.replies.get(file_name) {
      Some(Reply::Draft(v)) => Ok(Lookup::Found(serde_json::from_value(v.clone()).unwrap())),
      Some(Reply::Unparseable) | None => Ok(Lookup::unavailable("not JSON")),
      Some(Reply::Down) => Err(Unreachable),
    }
  }

  async fn info_card(&self, _observation: &Observation) -> Lookup<String> {
    match &self.card {
      Some(c) => Lookup::Found(c.clone()),
      None => Lookup::unavailable("no card"),
    }
  }
}

#[derive(Default)]
struct FakeWeather {
  asked: Arc<Mutex<Vec<(f64, f64, DateTime<Utc>)>>>,
}

impl WeatherSource for FakeWeather {
  async fn weather_at(&self, lat: f64, lng: f64, at: DateTime<Utc>) -> Lookup<Weather> {
    self.asked.lock().unwrap().push((lat, lng, at));
    Lookup::Found(drizzle())
  }
}

#[derive(Default)]
struct Recorder {
  events: Mutex<Vec<(Progress, String, Option<ItemOutcome>)>>,
}

impl ProgressReporter for Recorder {
  fn on_item_start(&self, progress: Progress, image_file: &str) {
    self.events.lock().unwrap().push((progress, image_file.into(), None));
  }

  fn on_item_done(&self, progress: Progress, image_file: &str, outcome: ItemOutcome) {
    self
      .events
      .lock()
      .unwrap()
      .push((progress, image_file.into(), Some(outcome)));
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn drizzle() -> Weather {
  Weather {
    temperature:   9.5,
    condition:     "Light Drizzle".into(),
    humidity:      93.0,
    wind_speed:    4.0,
    precipitation: Some(0.3),
    description:   "Light Drizzle".into(),
    icon:          None,
  }
}

fn captured() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 10, 12, 9, 40, 0).unwrap()
}

fn gps() -> ImageMetadata {
  ImageMetadata {
    latitude:    Some(50.87),
    longitude:   Some(-1.57),
    captured_at: Some(captured()),
    address:     Some("Bolderwood, New Forest".into()),
  }
}

fn draft(common: &str) -> Reply {
  Reply::Draft(json!({
    "scientificName": "Russula emetica",
    "commonName": common,
    "confidence": 64.6,
    "edibility": "Toxic",
    "keyFeatures": { "cap": "scarlet", "gillsOrPores": "white gills" },
    "ecologicalRole": "Mycorrhizal",
    "location": "Unknown"
  }))
}

struct Env {
  _dir:   TempDir,
  images: std::path::PathBuf,
  store:  JsonStore,
}

async fn env(images: &[&str]) -> Env {
  let dir = tempfile::tempdir().unwrap();
  let images_dir = dir.path().join("images");
  tokio::fs::create_dir_all(&images_dir).await.unwrap();
  for name in images {
    tokio::fs::write(images_dir.join(name), b"fake image").await.unwrap();
  }
  let store = JsonStore::open(dir.path().join("observations.json"));
  Env { _dir: dir, images: images_dir, store }
}

fn pipeline(
  env: &Env,
  metadata: FakeMetadata,
  identifier: FakeIdentifier,
  weather: FakeWeather,
  options: PipelineOptions,
) -> Pipeline<FakeMetadata, FakeIdentifier, FakeWeather> {
  Pipeline::new(&env.images, metadata, identifier, weather, options)
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analysis_merges_metadata_weather_and_card() {
  let env = env(&["red.jpg"]).await;
  let mut identifier = FakeIdentifier::default().reply("red.jpg", draft("The sickener"));
  identifier.card = Some("Q0FSRA==".into());
  let weather = FakeWeather::default();
  let asked = weather.asked.clone();
  let metadata = FakeMetadata { by_file: HashMap::from([("red.jpg".into(), gps())]) };
  let p = pipeline(&env, metadata, identifier, weather, PipelineOptions::default());

  let o = p.analyze("red.jpg", None).await.unwrap();
  assert_eq!(o.image_file, "red.jpg");
  assert_eq!(o.confidence, 65);
  assert_eq!(o.location, "Bolderwood, New Forest");
  assert_eq!(o.observation_time, Some(captured()));
  assert_eq!(o.observation_date, Some(captured().date_naive()));
  assert_eq!(o.weather, Some(drizzle()));
  assert_eq!(o.info_card_image.as_deref(), Some("Q0FSRA=="));
  assert_eq!(*asked.lock().unwrap(), [(50.87, -1.57, captured())]);
}

#[tokio::test]
async fn no_gps_and_no_model_location_is_unknown() {
  let env = env(&["red.jpg"]).await;
  let identifier = FakeIdentifier::default().reply("red.jpg", draft("The sickener"));
  let weather = FakeWeather::default();
  let asked = weather.asked.clone();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());

  let o = p.analyze("red.jpg", None).await.unwrap();
  assert_eq!(o.location, "Unknown");
  assert_eq!(o.location_data, None);
  assert_eq!(o.weather, None);
  assert!(asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn disabled_enrichment_is_skipped() {
  let env = env(&["red.jpg"]).await;
  let mut identifier = FakeIdentifier::default().reply("red.jpg", draft("The sickener"));
  identifier.card = Some("Q0FSRA==".into());
  let weather = FakeWeather::default();
  let asked = weather.asked.clone();
  let metadata = FakeMetadata { by_file: HashMap::from([("red.jpg".into(), gps())]) };
  let options = PipelineOptions { fetch_weather: false, generate_info_cards: false };
  let p = pipeline(&env, metadata, identifier, weather, options);

  let o = p.analyze("red.jpg", None).await.unwrap();
  assert_eq!(o.weather, None);
  assert_eq!(o.info_card_image, None);
  assert!(asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_mandatory_field_is_rejected() {
  let env = env(&["x.jpg"]).await;
  let identifier = FakeIdentifier::default().reply(
    "x.jpg",
    Reply::Draft(json!({ "scientificName": "Amanita", "commonName": "Amanita" })),
  );
  let weather = FakeWeather::default();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());

  let err = p.analyze("x.jpg", None).await.unwrap_err();
  assert!(matches!(err, Error::Invalid { .. }), "got {err:?}");
  assert!(err.is_rejection());
}

#[tokio::test]
async fn absent_image_and_unsafe_names_are_errors() {
  let env = env(&[]).await;
  let identifier = FakeIdentifier::default();
  let weather = FakeWeather::default();
  let calls = identifier.calls.clone();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());

  assert!(matches!(
    p.analyze("ghost.jpg", None).await,
    Err(Error::ImageNotFound(_))
  ));
  assert!(matches!(
    p.analyze("../observations.json", None).await,
    Err(Error::InvalidFileName(_))
  ));
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

// ─── Batch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unprocessed_run_saves_new_images_and_skips_bad_ones() {
  let env = env(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "notes.txt"]).await;
  let identifier = FakeIdentifier::default()
    .reply("a.jpg", draft("first"))
    .reply("b.jpg", Reply::Unparseable)
    .reply("c.jpg", Reply::Down)
    .reply("d.jpg", draft("fourth"));
  let weather = FakeWeather::default();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());
  let batch = Orchestrator::new(env.store.clone(), p, &env.images);

  let report = batch.run(&Mode::Unprocessed, &SilentReporter).await.unwrap();
  assert_eq!(report, BatchReport { saved: 2, skipped: 1, failed: 1 });

  let stored: Vec<_> = env
    .store
    .read_all()
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.image_file)
    .collect();
  assert_eq!(stored, ["a.jpg", "d.jpg"]);

  // Skipped and failed images stay unprocessed for the next run.
  assert_eq!(batch.plan(&Mode::Unprocessed).await.unwrap(), ["b.jpg", "c.jpg"]);
}

#[tokio::test]
async fn stored_images_are_not_reanalysed() {
  let env = env(&["a.jpg", "b.jpg"]).await;
  let identifier = FakeIdentifier::default()
    .reply("a.jpg", draft("first"))
    .reply("b.jpg", draft("second"));
  let weather = FakeWeather::default();
  let calls = identifier.calls.clone();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());
  let batch = Orchestrator::new(env.store.clone(), p, &env.images);

  batch.run(&Mode::Unprocessed, &SilentReporter).await.unwrap();
  let report = batch.run(&Mode::Unprocessed, &SilentReporter).await.unwrap();

  assert_eq!(report.total(), 0);
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reprocess_carries_forward_absent_fields() {
  let env = env(&["a.jpg", "b.jpg"]).await;

  // First pass with GPS, time and weather.
  let first = FakeIdentifier::default()
    .reply("a.jpg", draft("old name"))
    .reply("b.jpg", draft("other"));
  let metadata = FakeMetadata { by_file: HashMap::from([("a.jpg".into(), gps())]) };
  let p = pipeline(&env, metadata, first, FakeWeather::default(), PipelineOptions::default());
  Orchestrator::new(env.store.clone(), p, &env.images)
    .run(&Mode::Unprocessed, &SilentReporter)
    .await
    .unwrap();
  let before = env.store.get("a.jpg").await.unwrap().unwrap();

  // Second pass: no metadata at all, fresh identification.
  let second = FakeIdentifier::default().reply("a.jpg", draft("new name"));
  let p = pipeline(&env, FakeMetadata::default(), second, FakeWeather::default(), PipelineOptions::default());
  let report = Orchestrator::new(env.store.clone(), p, &env.images)
    .run(&Mode::Reprocess(vec!["a.jpg".into()]), &SilentReporter)
    .await
    .unwrap();
  assert_eq!(report.saved, 1);

  let all = env.store.read_all().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all[0].image_file, "a.jpg", "replaced in place");

  let after = &all[0];
  assert_eq!(after.common_name, "new name");
  assert_eq!(after.location_data, before.location_data);
  assert_eq!(after.location, "Bolderwood, New Forest");
  assert_eq!(after.observation_date, before.observation_date);
  assert_eq!(after.observation_time, before.observation_time);
  assert_eq!(after.weather, Some(drizzle()));
}

#[tokio::test]
async fn reprocess_all_covers_every_stored_record() {
  let env = env(&["a.jpg", "b.jpg"]).await;
  let identifier = FakeIdentifier::default()
    .reply("a.jpg", draft("one"))
    .reply("b.jpg", draft("two"));
  let weather = FakeWeather::default();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());
  let batch = Orchestrator::new(env.store.clone(), p, &env.images);
  batch.run(&Mode::Unprocessed, &SilentReporter).await.unwrap();

  let recorder = Recorder::default();
  let report = batch.run(&Mode::Reprocess(Vec::new()), &recorder).await.unwrap();
  assert_eq!(report.saved, 2);

  let events = recorder.events.lock().unwrap();
  assert_eq!(events.len(), 4);
  assert_eq!(events[0], (Progress { current: 1, total: 2 }, "a.jpg".into(), None));
  assert_eq!(
    events[3],
    (Progress { current: 2, total: 2 }, "b.jpg".into(), Some(ItemOutcome::Saved))
  );
}

#[tokio::test]
async fn corrupt_store_aborts_before_analysis() {
  let env = env(&["a.jpg"]).await;
  tokio::fs::write(env.store.path(), "{ not an array").await.unwrap();

  let identifier = FakeIdentifier::default().reply("a.jpg", draft("one"));
  let weather = FakeWeather::default();
  let calls = identifier.calls.clone();
  let p = pipeline(&env, FakeMetadata::default(), identifier, weather, PipelineOptions::default());

  let err = Orchestrator::new(env.store.clone(), p, &env.images)
    .run(&Mode::Unprocessed, &SilentReporter)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Store(_)));
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}
