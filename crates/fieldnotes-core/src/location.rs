//! Display-location helpers: coordinate formatting, placeholder detection,
//! and the normalised keys used to group and filter observations by place.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::observation::Observation;

/// Placeholder carried by [`Observation::location`] when nothing better is
/// known.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// `"{lat}, {lng}"` with six decimal places (~0.1 m).
pub fn format_coordinates(lat: f64, lng: f64) -> String {
  format!("{lat:.6}, {lng:.6}")
}

/// `true` for blank strings and the `"Unknown"` placeholder.
pub fn is_placeholder(location: &str) -> bool {
  let trimmed = location.trim();
  trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_LOCATION)
}

/// Normalised grouping key: comma-separated segments trimmed, inner
/// whitespace collapsed, empty segments dropped, lowercased.
///
/// `"Epping  Forest ,Essex, "` and `"epping forest, essex"` share a key.
pub fn location_key(location: &str) -> String {
  location
    .split(',')
    .map(|seg| seg.split_whitespace().collect::<Vec<_>>().join(" "))
    .filter(|seg| !seg.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
    .to_lowercase()
}

/// Short label for a location: its first comma-separated segment.
pub fn location_label(location: &str) -> &str {
  location.split(',').next().unwrap_or(location).trim()
}

/// Observations sharing one normalised location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
  pub key:         String,
  /// Short label taken from the first observation in the group.
  pub label:       String,
  pub count:       usize,
  pub image_files: Vec<String>,
}

/// Group observations by [`location_key`], sorted by key. Store order is
/// kept within each group.
pub fn group_by_location(observations: &[Observation]) -> Vec<LocationGroup> {
  let mut groups: BTreeMap<String, LocationGroup> = BTreeMap::new();
  for obs in observations {
    let key = location_key(&obs.location);
    let group = groups.entry(key.clone()).or_insert_with(|| LocationGroup {
      key,
      label:       location_label(&obs.location).to_owned(),
      count:       0,
      image_files: Vec::new(),
    });
    group.count += 1;
    group.image_files.push(obs.image_file.clone());
  }
  groups.into_values().collect()
}

/// Keep only observations whose location normalises to the same key as
/// `filter`.
pub fn filter_by_location<'a>(
  observations: impl IntoIterator<Item = &'a Observation>,
  filter: &str,
) -> Vec<&'a Observation> {
  let wanted = location_key(filter);
  observations
    .into_iter()
    .filter(|obs| location_key(&obs.location) == wanted)
    .collect()
}
