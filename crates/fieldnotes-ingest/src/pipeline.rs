//! Single-image analysis.

use std::{
  fmt,
  future::Future,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use fieldnotes_core::{
  Lookup, Observation,
  merge::{FieldContext, assemble},
  metadata::ImageMetadata,
  source::{Identifier, MetadataSource, WeatherSource},
};

use crate::{Error, Result, images::is_plain_file_name};

/// Per-image states. `Failed` can follow any step before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Pending,
  Extracting,
  Identifying,
  Validating,
  Saving,
  Done,
  Failed,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Pending => "pending",
      Self::Extracting => "extracting",
      Self::Identifying => "identifying",
      Self::Validating => "validating",
      Self::Saving => "saving",
      Self::Done => "done",
      Self::Failed => "failed",
    })
  }
}

/// Produces a complete, unsaved observation for one image file.
pub trait Analyzer: Send + Sync {
  /// `prior` is the stored record for the same file, if reprocessing.
  fn analyze<'a>(
    &'a self,
    image_file: &'a str,
    prior: Option<&'a Observation>,
  ) -> impl Future<Output = Result<Observation>> + Send + 'a;
}

/// Optional enrichment steps.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
  pub fetch_weather:       bool,
  pub generate_info_cards: bool,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self { fetch_weather: true, generate_info_cards: true }
  }
}

/// The production [`Analyzer`], composed from its collaborators.
pub struct Pipeline<M, I, W> {
  images_dir: PathBuf,
  metadata:   M,
  identifier: I,
  weather:    W,
  options:    PipelineOptions,
}

impl<M, I, W> Pipeline<M, I, W>
where
  M: MetadataSource,
  I: Identifier,
  W: WeatherSource,
{
  pub fn new(
    images_dir: impl Into<PathBuf>,
    metadata: M,
    identifier: I,
    weather: W,
    options: PipelineOptions,
  ) -> Self {
    Self { images_dir: images_dir.into(), metadata, identifier, weather, options }
  }

  pub fn images_dir(&self) -> &Path { &self.images_dir }

  async fn run(&self, image_file: &str, prior: Option<&Observation>) -> Result<Observation> {
    if !is_plain_file_name(image_file) {
      return Err(Error::InvalidFileName(image_file.to_owned()));
    }
    let path = self.images_dir.join(image_file);

    let bytes = match tokio::fs::read(&path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Err(Error::ImageNotFound(image_file.to_owned()));
      }
      Err(source) => return Err(Error::Io { path, source }),
    };

    tracing::debug!(image_file, stage = %Stage::Extracting);
    let metadata = match self.metadata.extract(&path).await {
      Lookup::Found(m) => m,
      Lookup::Unavailable { reason } => {
        tracing::info!(image_file, %reason, "no image metadata");
        ImageMetadata::default()
      }
    };

    tracing::debug!(image_file, stage = %Stage::Identifying);
    let draft = match self.identifier.identify(&bytes, image_file).await {
      Ok(Lookup::Found(draft)) => draft,
      Ok(Lookup::Unavailable { reason }) => {
        return Err(Error::Unidentified { file: image_file.to_owned(), reason });
      }
      Err(e) => {
        return Err(Error::Identify { file: image_file.to_owned(), source: Box::new(e) });
      }
    };

    tracing::debug!(image_file, stage = %Stage::Validating);
    let identification = draft.validate().map_err(|source| Error::Invalid {
      file: image_file.to_owned(),
      source,
    })?;

    let mut context = FieldContext::from_metadata(&metadata);
    if self.options.fetch_weather {
      context.weather = self.weather_for(image_file, &metadata).await;
    }

    let mut observation = assemble(image_file, identification, context, prior);

    if self.options.generate_info_cards {
      match self.identifier.info_card(&observation).await {
        Lookup::Found(card) => observation.info_card_image = Some(card),
        Lookup::Unavailable { reason } => {
          tracing::info!(image_file, %reason, "no info card");
        }
      }
    }

    Ok(observation.normalized())
  }

  async fn weather_for(
    &self,
    image_file: &str,
    metadata: &ImageMetadata,
  ) -> Option<fieldnotes_core::observation::Weather> {
    let ((lat, lng), at) = metadata.coordinates().zip(metadata.captured_at)?;
    match self.weather.weather_at(lat, lng, at).await {
      Lookup::Found(weather) => Some(weather),
      Lookup::Unavailable { reason } => {
        tracing::info!(image_file, %reason, "weather unavailable");
        None
      }
    }
  }
}

impl<M, I, W> Analyzer for Pipeline<M, I, W>
where
  M: MetadataSource,
  I: Identifier,
  W: WeatherSource,
{
  async fn analyze(
    &self,
    image_file: &str,
    prior: Option<&Observation>,
  ) -> Result<Observation> {
    self.run(image_file, prior).await
  }
}
