//! Turning the model's reply text into an [`IdentificationDraft`].

use fieldnotes_core::{Lookup, identification::IdentificationDraft};
use serde_json::Value;

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing
/// ```` ``` ````, if present.
pub fn strip_code_fences(text: &str) -> &str {
  let mut s = text.trim();
  if let Some(rest) = s.strip_prefix("```") {
    let rest = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    s = rest.trim_start();
  }
  if let Some(rest) = s.strip_suffix("```") {
    s = rest.trim_end();
  }
  s
}

/// Parse the reply. Anything that is not a JSON object is `Unavailable`; the
/// raw text is logged. Fields inside the object are read leniently.
pub fn parse_draft(text: &str) -> Lookup<IdentificationDraft> {
  let reason = match serde_json::from_str::<Value>(strip_code_fences(text)) {
    Ok(value @ Value::Object(_)) => match serde_json::from_value(value) {
      Ok(draft) => return Lookup::Found(draft),
      Err(e) => e.to_string(),
    },
    Ok(_) => "expected a JSON object".to_owned(),
    Err(e) => e.to_string(),
  };
  tracing::warn!(error = %reason, raw = %text, "model output is not a valid identification");
  Lookup::unavailable(format!("unparseable model output: {reason}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fences_with_language_tag_are_stripped() {
    assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
    assert_eq!(strip_code_fences("{}"), "{}");
  }

  #[test]
  fn fenced_object_parses() {
    let draft = parse_draft(
      "```json\n{\"scientificName\":\"Amanita muscaria\",\"confidence\":\"90\"}\n```",
    )
    .found()
    .unwrap();
    assert_eq!(draft.scientific_name.as_deref(), Some("Amanita muscaria"));
  }

  #[test]
  fn null_features_and_list_notes_are_tolerated() {
    let draft = parse_draft(
      r#"{"scientificName":"Amanita","commonName":"Amanita",
          "keyFeatures":{"cap":"white","gillsOrPores":null,"stipe":"ring"},
          "habitatNotes":["under oak","late summer"]}"#,
    )
    .found()
    .unwrap();
    let features = draft.key_features.clone().unwrap();
    assert_eq!(features.gills_or_pores, "");
    assert_eq!(draft.habitat_notes.as_deref(), Some("under oak, late summer"));
    assert!(draft.validate().is_ok());
  }

  #[test]
  fn prose_is_unavailable() {
    assert!(!parse_draft("I think this is a chanterelle.").is_found());
    assert!(!parse_draft("[1, 2]").is_found());
  }
}
