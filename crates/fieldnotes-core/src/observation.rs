//! Observation types — the unit of persisted knowledge.
//!
//! One [`Observation`] describes one photograph. The source file name is the
//! record's identity; everything else is replaced wholesale when the image is
//! reprocessed.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, lenient,
  location::{UNKNOWN_LOCATION, format_coordinates, is_placeholder},
};

/// Safety disclaimer used whenever the model leaves `warning` blank.
pub const DEFAULT_WARNING: &str =
  "Never consume wild mushrooms without expert identification.";

// ─── Enumerations ────────────────────────────────────────────────────────────

/// How safe a species is to eat.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum Edibility {
  #[default]
  Unknown,
  Edible,
  #[serde(rename = "Edible with Caution")]
  EdibleWithCaution,
  Inedible,
  Toxic,
  Psychoactive,
}

impl Edibility {
  pub const ALL: [Self; 6] = [
    Self::Unknown,
    Self::Edible,
    Self::EdibleWithCaution,
    Self::Inedible,
    Self::Toxic,
    Self::Psychoactive,
  ];

  /// The label used on the wire and in the model instruction.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unknown => "Unknown",
      Self::Edible => "Edible",
      Self::EdibleWithCaution => "Edible with Caution",
      Self::Inedible => "Inedible",
      Self::Toxic => "Toxic",
      Self::Psychoactive => "Psychoactive",
    }
  }

  /// Case-insensitive match against the wire labels.
  pub fn from_label(label: &str) -> Option<Self> {
    let label = label.trim();
    Self::ALL
      .into_iter()
      .find(|e| e.as_str().eq_ignore_ascii_case(label))
  }
}

impl fmt::Display for Edibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How the fungus obtains its nutrients.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum EcologicalRole {
  #[default]
  Unknown,
  Saprotrophic,
  Mycorrhizal,
  Parasitic,
}

impl EcologicalRole {
  pub const ALL: [Self; 4] = [
    Self::Unknown,
    Self::Saprotrophic,
    Self::Mycorrhizal,
    Self::Parasitic,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unknown => "Unknown",
      Self::Saprotrophic => "Saprotrophic",
      Self::Mycorrhizal => "Mycorrhizal",
      Self::Parasitic => "Parasitic",
    }
  }

  pub fn from_label(label: &str) -> Option<Self> {
    let label = label.trim();
    Self::ALL
      .into_iter()
      .find(|r| r.as_str().eq_ignore_ascii_case(label))
  }
}

impl fmt::Display for EcologicalRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Sub-records ─────────────────────────────────────────────────────────────

/// Free-text field-guide descriptors. Nulls and non-string values are read
/// as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFeatures {
  #[serde(default, deserialize_with = "lenient::text")]
  pub cap:               String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub gills_or_pores:    String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub stipe:             String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub spore_print_color: String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub other:             String,
}

/// Where the photograph was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
  pub address:            String,
  pub lat:                f64,
  pub lng:                f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub formatted_location: Option<String>,
}

impl LocationData {
  /// Build from raw coordinates, using the reverse-geocoded address when one
  /// is known and the formatted coordinates otherwise.
  pub fn from_coordinates(lat: f64, lng: f64, address: Option<String>) -> Self {
    let address = address
      .filter(|a| !a.trim().is_empty())
      .unwrap_or_else(|| format_coordinates(lat, lng));
    Self {
      formatted_location: Some(address.clone()),
      address,
      lat,
      lng,
    }
  }

  /// The display string an [`Observation::location`] must carry when this
  /// record is attached.
  pub fn display(&self) -> String {
    [self.formatted_location.as_deref(), Some(self.address.as_str())]
      .into_iter()
      .flatten()
      .find(|s| !is_placeholder(s))
      .map(str::to_owned)
      .unwrap_or_else(|| format_coordinates(self.lat, self.lng))
  }
}

/// Conditions at the time and place of the observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
  /// Degrees Celsius.
  pub temperature:   f64,
  pub condition:     String,
  /// Relative humidity, percent.
  pub humidity:      f64,
  /// km/h.
  pub wind_speed:    f64,
  /// Millimetres.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub precipitation: Option<f64>,
  pub description:   String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub icon:          Option<String>,
}

// ─── Observation ─────────────────────────────────────────────────────────────

/// A persisted identification of one photograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
  /// Original file name; the sole identity key in the store.
  pub image_file:       String,
  pub scientific_name:  String,
  pub common_name:      String,
  /// 0–100.
  pub confidence:       u8,
  pub edibility:        Edibility,
  pub warning:          String,
  pub key_features:     KeyFeatures,
  pub ecological_role:  EcologicalRole,
  #[serde(default)]
  pub habitat_notes:    String,
  #[serde(default)]
  pub fun_fact:         String,
  #[serde(default)]
  pub cooking_or_usage: String,
  /// Display location; never empty.
  pub location:         String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location_data:    Option<LocationData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub observation_date: Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub observation_time: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub weather:          Option<Weather>,
  /// Base64-encoded raster image.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub info_card_image:  Option<String>,
}

impl Observation {
  /// Reject records that cannot be stored as-is.
  pub fn validate(&self) -> Result<()> {
    if self.image_file.trim().is_empty() {
      return Err(Error::EmptyImageFile);
    }
    if self.confidence > 100 {
      return Err(Error::ConfidenceOutOfRange(self.confidence));
    }
    Ok(())
  }

  /// Re-establish the derived-field invariants: `location` follows
  /// `location_data` when present and is never blank, and `warning` is
  /// always populated.
  pub fn normalized(mut self) -> Self {
    self.location = match &self.location_data {
      Some(data) => data.display(),
      None if self.location.trim().is_empty() => UNKNOWN_LOCATION.to_owned(),
      None => self.location,
    };
    if self.warning.trim().is_empty() {
      self.warning = DEFAULT_WARNING.to_owned();
    }
    self
  }
}
