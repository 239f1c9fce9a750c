use std::pin::Pin;

use color_eyre::Result;
use log::{debug, warn};

use crate::{
    config::ApiKey,
    image_model::{GenerationResponse, ImageService, ReferenceImage, ResponsePart, Size},
};

pub mod gemini_api;
use gemini_api::{GenerateContentResponse, Part};

#[derive(Clone)]
pub struct Gemini {
    api_key: ApiKey,
    model: String,
    endpoint: String,
    send_image_size: bool,
    client: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: ApiKey, model: String, endpoint: String) -> Self {
        Self {
            api_key,
            model,
            endpoint,
            send_image_size: false,
            client: reqwest::Client::new(),
        }
    }

    /// Forward the requested size as `imageConfig.imageSize`. Only for models
    /// that accept it.
    pub fn with_image_size(mut self, send_image_size: bool) -> Self {
        self.send_image_size = send_image_size;
        self
    }

    fn request_body(
        &self,
        prompt: &str,
        reference: Option<&ReferenceImage>,
        size: Size,
    ) -> gemini_api::RequestBody {
        let image_size = self.send_image_size.then_some(size);
        if image_size.is_none() {
            debug!("Not forwarding size {size} to {}", self.model);
        }
        gemini_api::RequestBody::new(prompt, reference, image_size)
    }
}

impl ImageService for Gemini {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        reference: Option<&'a ReferenceImage>,
        size: Size,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResponse>> + Send + 'a>> {
        Box::pin(async move {
            let req = gemini_api::Request {
                api_key: &self.api_key,
                endpoint: &self.endpoint,
                model: &self.model,
                body: self.request_body(prompt, reference, size),
            };
            let response = gemini_api::generate_content(&req, &self.client).await?;
            Ok(into_generation_response(response))
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Only the first candidate is looked at. A response without candidates maps
/// to an empty part list.
fn into_generation_response(response: GenerateContentResponse) -> GenerationResponse {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!("Prompt was blocked: {reason}");
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        warn!("Response contained no candidates");
        return GenerationResponse::default();
    };
    if let Some(reason) = &candidate.finish_reason {
        debug!("Finish reason: {reason}");
    }

    let parts = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(ResponsePart::Text(text)),
            Part::InlineData { inline_data } => Some(ResponsePart::InlineImage {
                mime_type: inline_data.mime_type,
                data: inline_data.data,
            }),
            Part::Other(raw) => {
                debug!("Skipping unsupported part:\n{raw:#}");
                None
            }
        })
        .collect::<Vec<_>>();
    debug!("Response has {} usable parts", parts.len());

    GenerationResponse { parts }
}
