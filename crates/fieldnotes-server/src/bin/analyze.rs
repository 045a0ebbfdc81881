//! Batch analysis of the images directory.
//!
//! ```text
//! fieldnotes-analyze                       # every image without an observation
//! fieldnotes-analyze --reprocess           # every stored image
//! fieldnotes-analyze --reprocess a.jpg b.jpg
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fieldnotes_ingest::{
  BatchReport, Mode, Orchestrator, ProgressReporter,
  progress::{ItemOutcome, Progress},
};
use fieldnotes_server::AppConfig;
use fieldnotes_store_json::JsonStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Identify mushroom photographs and store the observations")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fieldnotes.toml")]
  config: PathBuf,

  /// Re-analyse images that already have an observation.
  #[arg(long)]
  reprocess: bool,

  /// Images to reprocess; all stored images when omitted.
  #[arg(requires = "reprocess")]
  files: Vec<String>,
}

/// Logs one line per image.
struct LogReporter;

impl ProgressReporter for LogReporter {
  fn on_batch_start(&self, total: usize) {
    if total == 0 {
      tracing::info!("nothing to analyse");
    }
  }

  fn on_item_start(&self, progress: Progress, image_file: &str) {
    tracing::info!("[{}/{}] analysing {image_file}", progress.current, progress.total);
  }

  fn on_item_done(&self, progress: Progress, image_file: &str, outcome: ItemOutcome) {
    tracing::info!(
      "[{}/{}] {image_file}: {outcome:?}",
      progress.current,
      progress.total
    );
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)
    .with_context(|| format!("failed to read config from {}", cli.config.display()))?;

  let gemini = cfg.gemini().context("cannot analyse images without a model")?;
  let pipeline = cfg.pipeline(gemini).context("failed to build analysis pipeline")?;
  let store = JsonStore::open(&cfg.store_path);

  let mode = if cli.reprocess { Mode::Reprocess(cli.files) } else { Mode::Unprocessed };

  let BatchReport { saved, skipped, failed } =
    Orchestrator::new(store, pipeline, &cfg.images_dir)
      .run(&mode, &LogReporter)
      .await
      .context("batch aborted")?;

  println!("saved {saved}, skipped {skipped}, failed {failed}");
  Ok(())
}
