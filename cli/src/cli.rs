use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use engine::image_model::{GenerationRequest, Size};
use indoc::indoc;

const EXAMPLES: &str = indoc! {"
    Examples:
      gemini-imagen --prompt \"A cat in space\" --output cat.png
      gemini-imagen --prompt \"Same style but blue\" --reference input.png --output blue.png
      gemini-imagen --prompt \"Abstract art\" --output art.png --size 2K
"};

/// Generate images using Google Gemini.
#[derive(Debug, clap::Parser)]
#[command(name = "gemini-imagen", after_help = EXAMPLES)]
pub struct Cli {
    /// Text prompt describing the image to generate
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub prompt: String,

    /// Output file path for the generated image
    #[arg(long)]
    pub output: PathBuf,

    /// Optional reference image path for style/content guidance
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Output image size
    #[arg(long, value_enum, default_value_t)]
    pub size: Size,

    /// Model to use instead of the one from the settings file
    #[arg(long)]
    pub model: Option<String>,

    /// Settings file to read instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            reference: self.reference.clone(),
            output: self.output.clone(),
            size: self.size,
        }
    }
}
