//! Mushroom identification through a generative vision model.
//!
//! [`GeminiClient`] implements [`fieldnotes_core::source::Identifier`]: it
//! sends the photograph with a fixed instruction, parses the reply into an
//! [`fieldnotes_core::identification::IdentificationDraft`], and can render an
//! illustrated field-guide card for a finished record.

pub mod error;
pub mod gemini;
pub mod parse;
pub mod prompt;

pub use error::{Error, Result};
pub use gemini::{GeminiClient, GeminiConfig};

/// MIME type for an image file name, by extension. Unrecognised extensions
/// are sent as JPEG.
pub fn mime_type(file_name: &str) -> &'static str {
  let ext = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase());
  match ext.as_deref() {
    Some("png") => "image/png",
    Some("webp") => "image/webp",
    _ => "image/jpeg",
  }
}
