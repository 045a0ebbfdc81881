//! The model's raw answer, before validation.
//!
//! Generative models drift from the requested schema, so the draft accepts
//! anything that is a JSON object: every field is optional and loosely
//! typed. [`IdentificationDraft::validate`] is the gate between a draft and
//! something that may be stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result, lenient,
  location::is_placeholder,
  observation::{DEFAULT_WARNING, EcologicalRole, Edibility, KeyFeatures},
};

/// Unvalidated identification as returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationDraft {
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub image_file:       Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub scientific_name:  Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub common_name:      Option<String>,
  /// Number or numeric string; anything else is ignored.
  #[serde(default)]
  pub confidence:       Option<Value>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub edibility:        Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub warning:          Option<String>,
  /// `None` unless the model sent an object.
  #[serde(default, deserialize_with = "lenient::optional")]
  pub key_features:     Option<KeyFeatures>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub ecological_role:  Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub habitat_notes:    Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub fun_fact:         Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub cooking_or_usage: Option<String>,
  #[serde(default, deserialize_with = "lenient::optional_text")]
  pub location:         Option<String>,
}

/// The descriptive half of an observation, after the validation gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
  pub scientific_name:  String,
  pub common_name:      String,
  pub confidence:       u8,
  pub edibility:        Edibility,
  pub warning:          String,
  pub key_features:     KeyFeatures,
  pub ecological_role:  EcologicalRole,
  pub habitat_notes:    String,
  pub fun_fact:         String,
  pub cooking_or_usage: String,
  /// Location text the model supplied, if it supplied a real one.
  pub location:         Option<String>,
}

impl IdentificationDraft {
  /// Check the mandatory fields and fill defaults for everything else.
  ///
  /// `scientificName`, `commonName` and `keyFeatures` must be present;
  /// blank names count as missing.
  pub fn validate(self) -> Result<Identification> {
    let scientific_name = non_blank(self.scientific_name)
      .ok_or(Error::MissingField("scientificName"))?;
    let common_name =
      non_blank(self.common_name).ok_or(Error::MissingField("commonName"))?;
    let key_features =
      self.key_features.ok_or(Error::MissingField("keyFeatures"))?;

    Ok(Identification {
      scientific_name,
      common_name,
      confidence: self
        .confidence
        .as_ref()
        .and_then(confidence_from_value)
        .unwrap_or(0),
      edibility: self
        .edibility
        .as_deref()
        .and_then(Edibility::from_label)
        .unwrap_or_default(),
      warning: non_blank(self.warning)
        .unwrap_or_else(|| DEFAULT_WARNING.to_owned()),
      key_features,
      ecological_role: self
        .ecological_role
        .as_deref()
        .and_then(EcologicalRole::from_label)
        .unwrap_or_default(),
      habitat_notes: self.habitat_notes.unwrap_or_default(),
      fun_fact: self.fun_fact.unwrap_or_default(),
      cooking_or_usage: self.cooking_or_usage.unwrap_or_default(),
      location: self.location.filter(|l| !is_placeholder(l)),
    })
  }
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Round and clamp a model-supplied confidence into `0..=100`.
pub fn confidence_from_value(value: &Value) -> Option<u8> {
  let raw = match value {
    Value::Number(n) => n.as_f64()?,
    Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
    _ => return None,
  };
  if !raw.is_finite() {
    return None;
  }
  Some(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn draft() -> IdentificationDraft {
    serde_json::from_value(json!({
      "imageFile": "x.jpg",
      "scientificName": "Cantharellus cibarius",
      "commonName": "Chanterelle",
      "confidence": 87,
      "edibility": "Edible",
      "warning": "Confirm with an expert.",
      "keyFeatures": { "cap": "golden", "gillsOrPores": "false gills" },
      "ecologicalRole": "Mycorrhizal",
      "location": "Unknown"
    }))
    .unwrap()
  }

  #[test]
  fn valid_draft_fills_defaults() {
    let id = draft().validate().unwrap();
    assert_eq!(id.confidence, 87);
    assert_eq!(id.edibility, Edibility::Edible);
    assert_eq!(id.key_features.stipe, "");
    assert_eq!(id.habitat_notes, "");
    assert_eq!(id.location, None, "placeholder location counts as absent");
  }

  #[test]
  fn missing_common_name_is_rejected() {
    let mut d = draft();
    d.common_name = Some("   ".into());
    assert!(matches!(d.validate(), Err(Error::MissingField("commonName"))));
  }

  #[test]
  fn missing_key_features_is_rejected() {
    let mut d = draft();
    d.key_features = None;
    assert!(matches!(d.validate(), Err(Error::MissingField("keyFeatures"))));
  }

  #[test]
  fn unknown_enum_labels_fall_back_to_unknown() {
    let mut d = draft();
    d.edibility = Some("Delicious".into());
    d.ecological_role = None;
    d.warning = None;
    let id = d.validate().unwrap();
    assert_eq!(id.edibility, Edibility::Unknown);
    assert_eq!(id.ecological_role, EcologicalRole::Unknown);
    assert_eq!(id.warning, DEFAULT_WARNING);
  }

  #[test]
  fn drifted_reply_still_validates() {
    let d: IdentificationDraft = serde_json::from_value(json!({
      "scientificName": "Amanita",
      "commonName": "Amanita",
      "confidence": "80%",
      "keyFeatures": {
        "cap": "white",
        "gillsOrPores": null,
        "stipe": "ring and volva",
        "sporePrintColor": null
      },
      "habitatNotes": ["oak", "beech"],
      "funFact": null,
      "warning": 42
    }))
    .unwrap();

    let id = d.validate().unwrap();
    assert_eq!(id.key_features.gills_or_pores, "");
    assert_eq!(id.key_features.cap, "white");
    assert_eq!(id.habitat_notes, "oak, beech");
    assert_eq!(id.fun_fact, "");
    assert_eq!(id.warning, "42");
    assert_eq!(id.confidence, 80);
  }

  #[test]
  fn non_object_key_features_count_as_missing() {
    let d: IdentificationDraft = serde_json::from_value(json!({
      "scientificName": "Amanita",
      "commonName": "Amanita",
      "keyFeatures": "white cap"
    }))
    .unwrap();
    assert!(matches!(d.validate(), Err(Error::MissingField("keyFeatures"))));
  }

  #[test]
  fn confidence_is_rounded_and_clamped() {
    assert_eq!(confidence_from_value(&json!(72.6)), Some(73));
    assert_eq!(confidence_from_value(&json!(250)), Some(100));
    assert_eq!(confidence_from_value(&json!(-4)), Some(0));
    assert_eq!(confidence_from_value(&json!("65%")), Some(65));
    assert_eq!(confidence_from_value(&json!(true)), None);
  }
}
