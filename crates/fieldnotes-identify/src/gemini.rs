//! [`GeminiClient`] — `generateContent` over REST.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use fieldnotes_core::{
  Lookup, Observation, identification::IdentificationDraft, source::Identifier,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, mime_type, parse, prompt};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

const CARD_ASPECT_RATIO: &str = "4:3";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
  pub contents:          Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:  Option<String>,
  #[serde(default)]
  pub parts: Vec<Part>,
}

/// One part of a message: text or inline binary data.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub inline_data: Option<InlineData>,
}

impl Part {
  fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), inline_data: None }
  }

  fn inline(mime_type: &str, data: String) -> Self {
    Self {
      text:        None,
      inline_data: Some(InlineData { mime_type: mime_type.to_owned(), data }),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
  pub mime_type: String,
  /// Base64.
  pub data:      String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  pub response_modalities: Vec<&'static str>,
  pub image_config:        ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
  pub aspect_ratio: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
  #[serde(default)]
  pub candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseCandidate {
  #[serde(default)]
  pub content: Option<Content>,
}

impl GenerateResponse {
  fn parts(&self) -> impl Iterator<Item = &Part> {
    self
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .into_iter()
      .flat_map(|c| c.parts.iter())
  }

  /// All text parts of the first candidate, concatenated.
  pub fn text(&self) -> String {
    self.parts().filter_map(|p| p.text.as_deref()).collect()
  }

  /// Data of the first inline part of the first candidate.
  pub fn first_inline_data(&self) -> Option<&str> {
    self
      .parts()
      .find_map(|p| p.inline_data.as_ref())
      .map(|d| d.data.as_str())
      .filter(|d| !d.is_empty())
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Connection settings for the model API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key:     String,
  pub base_url:    String,
  pub model:       String,
  pub image_model: String,
  pub timeout:     Duration,
}

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:     api_key.into(),
      base_url:    DEFAULT_BASE_URL.to_owned(),
      model:       DEFAULT_MODEL.to_owned(),
      image_model: DEFAULT_IMAGE_MODEL.to_owned(),
      timeout:     Duration::from_secs(120),
    }
  }
}

/// Async client for `generateContent`.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client: reqwest::Client,
  config: GeminiConfig,
}

impl std::fmt::Debug for GeminiClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GeminiClient")
      .field("base_url", &self.config.base_url)
      .field("model", &self.config.model)
      .field("image_model", &self.config.image_model)
      .finish_non_exhaustive()
  }
}

impl GeminiClient {
  /// Fails with [`Error::MissingApiKey`] for a blank key.
  pub fn new(config: GeminiConfig) -> Result<Self> {
    if config.api_key.trim().is_empty() {
      return Err(Error::MissingApiKey);
    }
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, model: &str) -> String {
    format!(
      "{}/v1beta/models/{model}:generateContent",
      self.config.base_url.trim_end_matches('/'),
    )
  }

  /// `POST /v1beta/models/<model>:generateContent`
  pub async fn generate(
    &self,
    model: &str,
    request: &GenerateRequest,
  ) -> Result<GenerateResponse> {
    let resp = self
      .client
      .post(self.url(model))
      .header("x-goog-api-key", &self.config.api_key)
      .json(request)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }
    Ok(resp.json().await?)
  }

  /// Identify the mushroom in `image`.
  pub async fn identify_image(
    &self,
    image: &[u8],
    file_name: &str,
  ) -> Result<Lookup<IdentificationDraft>> {
    let request = GenerateRequest {
      contents:          vec![Content {
        role:  Some("user".into()),
        parts: vec![
          Part::text(prompt::IDENTIFY_INSTRUCTION),
          Part::inline(mime_type(file_name), STANDARD.encode(image)),
          Part::text(prompt::file_name_instruction(file_name)),
        ],
      }],
      generation_config: None,
    };

    tracing::debug!(file_name, model = %self.config.model, bytes = image.len(), "identifying");
    let response = self.generate(&self.config.model, &request).await?;

    let text = response.text();
    if text.trim().is_empty() {
      return Ok(Lookup::unavailable("model returned no text"));
    }
    Ok(parse::parse_draft(&text))
  }

  /// Render an illustrated card for `observation`; returns base64 image data.
  pub async fn render_card(&self, observation: &Observation) -> Lookup<String> {
    let request = GenerateRequest {
      contents:          vec![Content {
        role:  Some("user".into()),
        parts: vec![Part::text(prompt::info_card(observation))],
      }],
      generation_config: Some(GenerationConfig {
        response_modalities: vec!["TEXT", "IMAGE"],
        image_config:        ImageConfig { aspect_ratio: CARD_ASPECT_RATIO },
      }),
    };

    match self.generate(&self.config.image_model, &request).await {
      Ok(response) => match response.first_inline_data() {
        Some(data) => Lookup::Found(data.to_owned()),
        None => Lookup::unavailable("no image data in card response"),
      },
      Err(e) => {
        tracing::warn!(
          image_file = %observation.image_file,
          error = %e,
          "info card generation failed"
        );
        Lookup::unavailable(e.to_string())
      }
    }
  }
}

impl Identifier for GeminiClient {
  type Error = Error;

  async fn identify(
    &self,
    image: &[u8],
    file_name: &str,
  ) -> Result<Lookup<IdentificationDraft>> {
    self.identify_image(image, file_name).await
  }

  async fn info_card(&self, observation: &Observation) -> Lookup<String> {
    self.render_card(observation).await
  }
}
