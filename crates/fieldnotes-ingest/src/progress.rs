//! Progress callbacks for batch runs.
//!
//! The orchestrator reports through a [`ProgressReporter`]; every method has a
//! no-op default, so reporters implement only what they show.

/// Position of the current item within a batch, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
  pub current: usize,
  pub total:   usize,
}

/// How a single image ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
  Saved,
  /// Unidentifiable or rejected by validation; left unprocessed.
  Skipped,
  Failed,
}

/// Trait for reporting batch progress to the caller.
///
/// All methods have default no-op implementations so callers only need to
/// override the events they care about.
pub trait ProgressReporter: Send + Sync {
  fn on_batch_start(&self, _total: usize) {}
  fn on_item_start(&self, _progress: Progress, _image_file: &str) {}
  fn on_item_done(&self, _progress: Progress, _image_file: &str, _outcome: ItemOutcome) {}
  fn on_batch_complete(&self, _report: &crate::BatchReport) {}
}

/// A no-op reporter for when progress reporting isn't needed.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
