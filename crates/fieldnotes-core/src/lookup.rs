//! [`Lookup`] — the outcome of a collaborator that is allowed to come back
//! empty-handed.
//!
//! Geocoding, weather, EXIF parsing, info-card generation and model-output
//! parsing all degrade instead of failing the pipeline. Returning a `Lookup`
//! keeps "nothing available" distinct from a real error at every call site.

/// Either a value or an explicit marker that none could be obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
  Found(T),
  Unavailable {
    /// Human-readable cause, for logs only.
    reason: String,
  },
}

impl<T> Lookup<T> {
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable { reason: reason.into() }
  }

  pub fn is_found(&self) -> bool { matches!(self, Self::Found(_)) }

  /// Discard the reason and keep only the value.
  pub fn found(self) -> Option<T> {
    match self {
      Self::Found(v) => Some(v),
      Self::Unavailable { .. } => None,
    }
  }

  pub fn reason(&self) -> Option<&str> {
    match self {
      Self::Found(_) => None,
      Self::Unavailable { reason } => Some(reason),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
    match self {
      Self::Found(v) => Lookup::Found(f(v)),
      Self::Unavailable { reason } => Lookup::Unavailable { reason },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn found_keeps_value() {
    let l = Lookup::Found(3).map(|v| v * 2);
    assert!(l.is_found());
    assert_eq!(l.found(), Some(6));
  }

  #[test]
  fn unavailable_carries_reason() {
    let l: Lookup<u8> = Lookup::unavailable("HTTP 503");
    assert_eq!(l.reason(), Some("HTTP 503"));
    assert_eq!(l.map(|v| v + 1).found(), None);
  }
}
