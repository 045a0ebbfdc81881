//! [`JsonStore`] — the flat-file implementation of [`ObservationStore`].

use std::{
  collections::{BTreeSet, HashSet},
  io::ErrorKind,
  path::{Path, PathBuf},
};

use fieldnotes_core::{Observation, lenient, store::ObservationStore};
use serde_json::Value;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An observation store backed by a single JSON file.
///
/// Cloning is cheap; clones address the same file. Nothing is cached, so
/// every call sees the file as it is on disk. Records that drift from the
/// schema are coerced on read; only a file that is not a JSON array of
/// objects is [`Error::Corrupt`].
#[derive(Debug, Clone)]
pub struct JsonStore {
  path: PathBuf,
}

impl JsonStore {
  /// Address a store at `path`. The file (and its directory) is created on
  /// first write.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn load(&self) -> Result<Vec<Observation>> {
    let raw = match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        tracing::debug!(path = %self.path.display(), "store file absent, treating as empty");
        return Ok(Vec::new());
      }
      Err(source) => {
        return Err(Error::Io { path: self.path.clone(), source });
      }
    };

    let corrupt = |source| Error::Corrupt { path: self.path.clone(), source };
    let records: Vec<Value> = serde_json::from_str(&raw).map_err(corrupt)?;
    records
      .into_iter()
      .map(lenient::stored_observation)
      .collect::<serde_json::Result<_>>()
      .map_err(corrupt)
  }

  async fn save(&self, records: &[Observation]) -> Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    }

    let mut body = serde_json::to_string_pretty(records)?;
    body.push('\n');

    tokio::fs::write(&self.path, body)
      .await
      .map_err(|source| Error::Io { path: self.path.clone(), source })
  }
}

// ─── ObservationStore impl ───────────────────────────────────────────────────

impl ObservationStore for JsonStore {
  type Error = Error;

  async fn read_all(&self) -> Result<Vec<Observation>> {
    self.load().await
  }

  async fn upsert(&self, record: Observation) -> Result<Observation> {
    let record = record.normalized();
    record.validate()?;

    let mut records = self.load().await?;

    match records.iter().position(|r| r.image_file == record.image_file) {
      Some(index) => {
        tracing::debug!(image_file = %record.image_file, index, "replacing observation");
        records[index] = record.clone();
      }
      None => {
        tracing::debug!(image_file = %record.image_file, "appending observation");
        records.push(record.clone());
      }
    }

    self.save(&records).await?;
    Ok(record)
  }

  async fn unprocessed(&self, image_files: &[String]) -> Result<Vec<String>> {
    let records = self.load().await?;
    let known: HashSet<&str> =
      records.iter().map(|r| r.image_file.as_str()).collect();

    let pending: BTreeSet<&String> = image_files
      .iter()
      .filter(|f| !known.contains(f.as_str()))
      .collect();

    Ok(pending.into_iter().cloned().collect())
  }
}
