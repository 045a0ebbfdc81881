//! The images directory.

use std::{io::ErrorKind, path::Path};

use crate::{Error, Result};

/// Extensions treated as photographs, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Matches on the extension alone, so a dotfile such as `.jpg` counts.
pub fn is_image(file_name: &str) -> bool {
  file_name
    .rsplit_once('.')
    .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// A bare file name: no separators, not `.` or `..`.
pub fn is_plain_file_name(file_name: &str) -> bool {
  !file_name.is_empty()
    && file_name != "."
    && file_name != ".."
    && !file_name.contains(['/', '\\'])
}

/// Image file names directly inside `dir`, sorted. A missing directory
/// has no images.
pub async fn list_images(dir: &Path) -> Result<Vec<String>> {
  let io_err = |source| Error::Io { path: dir.to_path_buf(), source };

  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      tracing::debug!(dir = %dir.display(), "images directory absent");
      return Ok(Vec::new());
    }
    Err(e) => return Err(io_err(e)),
  };

  let mut files = Vec::new();
  while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
    if !entry.file_type().await.map_err(io_err)?.is_file() {
      continue;
    }
    // Names that are not valid UTF-8 cannot be stored as keys.
    match entry.file_name().into_string() {
      Ok(name) if is_image(&name) => files.push(name),
      _ => {}
    }
  }

  files.sort();
  Ok(files)
}
