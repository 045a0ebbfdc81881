//! Assembling an [`Observation`] from a validated identification, the
//! field context recovered from the image, and (on reprocess) the record
//! already in the store.
//!
//! Descriptive and taxonomic fields always come from the fresh analysis.
//! Location, date/time and weather are carried forward from the prior record
//! only when the fresh analysis leaves them absent. An empty value is not
//! absent.

use chrono::{DateTime, Utc};

use crate::{
  identification::Identification,
  location::{UNKNOWN_LOCATION, is_placeholder},
  metadata::ImageMetadata,
  observation::{LocationData, Observation, Weather},
};

/// Everything about an observation that does not come from the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldContext {
  pub location_data: Option<LocationData>,
  pub captured_at:   Option<DateTime<Utc>>,
  pub weather:       Option<Weather>,
}

impl FieldContext {
  pub fn from_metadata(metadata: &ImageMetadata) -> Self {
    Self {
      location_data: metadata.location_data(),
      captured_at:   metadata.captured_at,
      weather:       None,
    }
  }
}

/// Build the record to store for `image_file`.
///
/// `prior` is the currently stored record for the same file, if any.
pub fn assemble(
  image_file: &str,
  identification: Identification,
  context: FieldContext,
  prior: Option<&Observation>,
) -> Observation {
  let location_data = context
    .location_data
    .or_else(|| prior.and_then(|p| p.location_data.clone()));

  let location = match &location_data {
    Some(data) => data.display(),
    None => identification
      .location
      .or_else(|| {
        prior
          .map(|p| p.location.clone())
          .filter(|l| !is_placeholder(l))
      })
      .unwrap_or_else(|| UNKNOWN_LOCATION.to_owned()),
  };

  let (observation_date, observation_time) = match context.captured_at {
    Some(at) => (Some(at.date_naive()), Some(at)),
    None => (
      prior.and_then(|p| p.observation_date),
      prior.and_then(|p| p.observation_time),
    ),
  };

  let weather = context
    .weather
    .or_else(|| prior.and_then(|p| p.weather.clone()));

  Observation {
    image_file: image_file.to_owned(),
    scientific_name: identification.scientific_name,
    common_name: identification.common_name,
    confidence: identification.confidence,
    edibility: identification.edibility,
    warning: identification.warning,
    key_features: identification.key_features,
    ecological_role: identification.ecological_role,
    habitat_notes: identification.habitat_notes,
    fun_fact: identification.fun_fact,
    cooking_or_usage: identification.cooking_or_usage,
    location,
    location_data,
    observation_date,
    observation_time,
    weather,
    info_card_image: None,
  }
}
