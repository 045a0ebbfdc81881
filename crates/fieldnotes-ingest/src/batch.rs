//! [`Orchestrator`] — sequential batch analysis.

use std::path::PathBuf;

use fieldnotes_core::store::ObservationStore;

use crate::{
  Error, Result,
  images::list_images,
  pipeline::{Analyzer, Stage},
  progress::{ItemOutcome, Progress, ProgressReporter},
};

/// Which images a batch run covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
  /// Every image in the images directory without a stored record.
  #[default]
  Unprocessed,
  /// Re-analyse stored images: the named files, or every stored record when
  /// the list is empty.
  Reprocess(Vec<String>),
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
  pub saved:   usize,
  pub skipped: usize,
  pub failed:  usize,
}

impl BatchReport {
  pub fn total(&self) -> usize { self.saved + self.skipped + self.failed }
}

/// Drives an [`Analyzer`] over a set of images and persists the results.
///
/// Images are processed one at a time; a failure on one image is logged and
/// the run moves on. Only store read failures abort the run.
pub struct Orchestrator<S, A> {
  store:      S,
  analyzer:   A,
  images_dir: PathBuf,
}

impl<S, A> Orchestrator<S, A>
where
  S: ObservationStore,
  A: Analyzer,
{
  pub fn new(store: S, analyzer: A, images_dir: impl Into<PathBuf>) -> Self {
    Self { store, analyzer, images_dir: images_dir.into() }
  }

  /// Image files the run would cover, in processing order.
  pub async fn plan(&self, mode: &Mode) -> Result<Vec<String>> {
    match mode {
      Mode::Unprocessed => {
        let files = list_images(&self.images_dir).await?;
        self.store.unprocessed(&files).await.map_err(Error::store)
      }
      Mode::Reprocess(files) if files.is_empty() => Ok(
        self
          .store
          .read_all()
          .await
          .map_err(Error::store)?
          .into_iter()
          .map(|o| o.image_file)
          .collect(),
      ),
      Mode::Reprocess(files) => Ok(files.clone()),
    }
  }

  pub async fn run(
    &self,
    mode: &Mode,
    reporter: &impl ProgressReporter,
  ) -> Result<BatchReport> {
    let files = self.plan(mode).await?;
    let total = files.len();
    tracing::info!(total, ?mode, "batch starting");
    reporter.on_batch_start(total);

    let mut report = BatchReport::default();
    for (index, file) in files.iter().enumerate() {
      let progress = Progress { current: index + 1, total };
      reporter.on_item_start(progress, file);

      let outcome = self.process(file).await?;
      match outcome {
        ItemOutcome::Saved => report.saved += 1,
        ItemOutcome::Skipped => report.skipped += 1,
        ItemOutcome::Failed => report.failed += 1,
      }
      reporter.on_item_done(progress, file, outcome);
    }

    tracing::info!(
      saved = report.saved,
      skipped = report.skipped,
      failed = report.failed,
      "batch complete"
    );
    reporter.on_batch_complete(&report);
    Ok(report)
  }

  /// Analyse and save one image. `Err` only when the store cannot be read.
  async fn process(&self, file: &str) -> Result<ItemOutcome> {
    tracing::debug!(image_file = file, stage = %Stage::Pending);
    let prior = self.store.get(file).await.map_err(Error::store)?;

    let observation = match self.analyzer.analyze(file, prior.as_ref()).await {
      Ok(o) => o,
      Err(e) if e.is_rejection() => {
        tracing::warn!(image_file = file, error = %e, "skipping image");
        return Ok(ItemOutcome::Skipped);
      }
      Err(e) => {
        tracing::error!(image_file = file, error = %e, stage = %Stage::Failed);
        return Ok(ItemOutcome::Failed);
      }
    };

    tracing::debug!(image_file = file, stage = %Stage::Saving);
    match self.store.upsert(observation).await {
      Ok(saved) => {
        tracing::info!(
          image_file = file,
          common_name = %saved.common_name,
          confidence = saved.confidence,
          stage = %Stage::Done
        );
        Ok(ItemOutcome::Saved)
      }
      Err(e) => {
        tracing::error!(image_file = file, error = %e, "failed to save observation");
        Ok(ItemOutcome::Failed)
      }
    }
  }
}
