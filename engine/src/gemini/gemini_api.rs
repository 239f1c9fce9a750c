use base64::{Engine as _, engine::general_purpose::STANDARD};
use color_eyre::Result;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

mod error;
pub use error::GeminiApiError;

use crate::{
    config::ApiKey,
    image_model::{ReferenceImage, Size},
};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

#[derive(Debug)]
pub struct Request<'a> {
    pub api_key: &'a ApiKey,
    pub endpoint: &'a str,
    pub model: &'a str,
    pub body: RequestBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl RequestBody {
    /// One user turn: the prompt, followed by the reference image if there is one.
    /// `image_size` is only sent when given, not every image model accepts it.
    pub fn new(prompt: &str, reference: Option<&ReferenceImage>, image_size: Option<Size>) -> Self {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(reference) = reference {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: Some(reference.mime_type.clone()),
                    data: STANDARD.encode(&reference.data),
                },
            });
        }

        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Text, Modality::Image],
                image_config: image_size.map(|image_size| ImageConfig { image_size }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Variant order matters, untagged decoding tries them top to bottom.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Image,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub image_size: Size,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Sends a single `generateContent` call. Non-success statuses become a
/// [`GeminiApiError`].
pub async fn generate_content(req: &Request<'_>, client: &Client) -> Result<GenerateContentResponse> {
    let url = format!(
        "{}/{}:generateContent",
        req.endpoint.trim_end_matches('/'),
        req.model
    );
    debug!("POST {url}");

    let resp = client
        .post(&url)
        .header("x-goog-api-key", req.api_key.expose())
        .json(&req.body)
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(GeminiApiError::from_response(status.as_u16(), &text).into());
    }

    Ok(serde_json::from_str(&text)?)
}
