use std::{path::PathBuf, pin::Pin};

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Output resolution requested from the generation service.
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum Size {
    #[value(name = "1K")]
    #[strum(to_string = "1K")]
    #[serde(rename = "1K")]
    OneK,
    #[value(name = "2K")]
    #[strum(to_string = "2K")]
    #[serde(rename = "2K")]
    TwoK,
    #[default]
    #[value(name = "4K")]
    #[strum(to_string = "4K")]
    #[serde(rename = "4K")]
    FourK,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference: Option<PathBuf>,
    pub output: PathBuf,
    pub size: Size,
}

/// A reference image as it is sent to the service: raw file bytes plus the
/// sniffed MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    /// `data` is still base64 wrapped, exactly as it came over the wire.
    InlineImage {
        mime_type: Option<String>,
        data: String,
    },
}

pub trait ImageService {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        reference: Option<&'a ReferenceImage>,
        size: Size,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationResponse>> + Send + 'a>>;

    fn model(&self) -> &str;
}
