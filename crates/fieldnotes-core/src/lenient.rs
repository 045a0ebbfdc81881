//! Tolerant decoding for JSON that was not necessarily written by us.
//!
//! Model replies and older observation files drift from the schema: nulls
//! where text belongs, fractional confidence, lists instead of prose. The
//! helpers here are `#[serde(deserialize_with = ...)]` targets that coerce
//! such values instead of failing the whole document. Pair every use with
//! `#[serde(default)]` so absent fields decode too.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  identification::confidence_from_value,
  observation::{
    EcologicalRole, Edibility, KeyFeatures, LocationData, Observation, Weather,
  },
};

// ─── Field helpers ───────────────────────────────────────────────────────────

/// Text from any JSON value; `null` becomes `""`.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Ok(value_text(Value::deserialize(d)?).unwrap_or_default())
}

/// Text from any JSON value; `null` becomes `None`.
pub fn optional_text<'de, D: Deserializer<'de>>(
  d: D,
) -> Result<Option<String>, D::Error> {
  Ok(value_text(Value::deserialize(d)?))
}

/// `T` when the value has its shape, `None` otherwise.
pub fn optional<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

/// `T` when the value has its shape, `T::default()` otherwise.
pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned + Default,
{
  Ok(optional(d)?.unwrap_or_default())
}

/// Rounded and clamped into `0..=100`; unusable values become 0.
pub fn confidence<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
  Ok(confidence_from_value(&Value::deserialize(d)?).unwrap_or(0))
}

/// Case-insensitive label match; anything else is the `Unknown` default.
pub fn label<'de, D, T>(d: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Label,
{
  Ok(match Value::deserialize(d)? {
    Value::String(s) => T::parse_label(&s).unwrap_or_default(),
    _ => T::default(),
  })
}

/// Enumerations that decode from their display label.
pub trait Label: Default + Sized {
  fn parse_label(label: &str) -> Option<Self>;
}

impl Label for Edibility {
  fn parse_label(label: &str) -> Option<Self> { Edibility::from_label(label) }
}

impl Label for EcologicalRole {
  fn parse_label(label: &str) -> Option<Self> {
    EcologicalRole::from_label(label)
  }
}

fn value_text(value: Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Array(items) => Some(
      items
        .into_iter()
        .filter_map(value_text)
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", "),
    ),
    other @ Value::Object(_) => Some(other.to_string()),
  }
}

// ─── Stored observations ─────────────────────────────────────────────────────

/// The on-disk shape of an observation, accepted as loosely as possible.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredObservation {
  #[serde(default, deserialize_with = "text")]
  image_file:       String,
  #[serde(default, deserialize_with = "text")]
  scientific_name:  String,
  #[serde(default, deserialize_with = "text")]
  common_name:      String,
  #[serde(default, deserialize_with = "confidence")]
  confidence:       u8,
  #[serde(default, deserialize_with = "label")]
  edibility:        Edibility,
  #[serde(default, deserialize_with = "text")]
  warning:          String,
  #[serde(default, deserialize_with = "or_default")]
  key_features:     KeyFeatures,
  #[serde(default, deserialize_with = "label")]
  ecological_role:  EcologicalRole,
  #[serde(default, deserialize_with = "text")]
  habitat_notes:    String,
  #[serde(default, deserialize_with = "text")]
  fun_fact:         String,
  #[serde(default, deserialize_with = "text")]
  cooking_or_usage: String,
  #[serde(default, deserialize_with = "text")]
  location:         String,
  #[serde(default, deserialize_with = "optional")]
  location_data:    Option<LocationData>,
  #[serde(default, deserialize_with = "optional")]
  observation_date: Option<NaiveDate>,
  #[serde(default, deserialize_with = "optional")]
  observation_time: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "optional")]
  weather:          Option<Weather>,
  #[serde(default, deserialize_with = "optional_text")]
  info_card_image:  Option<String>,
}

impl From<StoredObservation> for Observation {
  fn from(s: StoredObservation) -> Self {
    Observation {
      image_file:       s.image_file,
      scientific_name:  s.scientific_name,
      common_name:      s.common_name,
      confidence:       s.confidence,
      edibility:        s.edibility,
      warning:          s.warning,
      key_features:     s.key_features,
      ecological_role:  s.ecological_role,
      habitat_notes:    s.habitat_notes,
      fun_fact:         s.fun_fact,
      cooking_or_usage: s.cooking_or_usage,
      location:         s.location,
      location_data:    s.location_data,
      observation_date: s.observation_date,
      observation_time: s.observation_time,
      weather:          s.weather,
      info_card_image:  s.info_card_image,
    }
  }
}

/// Decode one stored record, coercing every field that can be coerced.
///
/// Fails only when `value` cannot be read as a record at all, such as a bare
/// string or number. The result is
/// [`Observation::normalized`].
pub fn stored_observation(value: Value) -> serde_json::Result<Observation> {
  let stored: StoredObservation = serde_json::from_value(value)?;
  Ok(Observation::from(stored).normalized())
}
