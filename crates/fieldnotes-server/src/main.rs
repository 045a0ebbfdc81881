//! fieldnotes-server binary.
//!
//! Reads `fieldnotes.toml` (or the path given with `--config`) and
//! `FIELDNOTES_*` environment variables, then serves the JSON API under
//! `/api` and the images directory under `/images`.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use fieldnotes_core::store::ObservationStore;
use fieldnotes_server::AppConfig;
use fieldnotes_store_json::JsonStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Field Notes server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "fieldnotes.toml")]
  config: PathBuf,
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

  let store = JsonStore::open(&cfg.store_path);
  match store.read_all().await {
    Ok(all) => tracing::info!(path = %cfg.store_path.display(), count = all.len(), "store opened"),
    // Served as 500s until the file is repaired.
    Err(e) => tracing::error!(error = %e, "observation store is unreadable"),
  }

  let analyzer = match cfg.gemini() {
    Ok(gemini) => Some(cfg.pipeline(gemini).context("failed to build analysis pipeline")?),
    Err(fieldnotes_identify::Error::MissingApiKey) => {
      tracing::warn!("GEMINI_API_KEY is not set; /api/analyze will answer 503");
      None
    }
    Err(e) => return Err(e).context("failed to build model client"),
  };
  let weather = cfg.weather_client().context("failed to build weather client")?;

  let app = fieldnotes_server::router(&cfg, store, analyzer, weather);
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
