//! The single generation pipeline: load the optional reference image, make
//! sure the output directory exists, call the service once, then save every
//! image part of the response to the output path.
//!
//! Progress messages go to the writer passed to [`Orchestrator::run`]. Every
//! failure comes back as a [`GenerateError`], nothing is printed to stderr
//! here.

use std::{
    io::{self, Cursor, Write},
    path::Path,
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, ImageReader};
use log::{debug, info};

use crate::{
    FsBox, ImgServiceBox,
    error::GenerateError,
    image_model::{GenerationRequest, GenerationResponse, ReferenceImage, ResponsePart, Size},
};

/// Reference formats the service takes as they are.
const SENDABLE_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

pub struct Orchestrator {
    service: ImgServiceBox,
    fs: FsBox,
}

impl Orchestrator {
    pub fn new(service: ImgServiceBox, fs: FsBox) -> Self {
        Self { service, fs }
    }

    pub async fn run(
        &self,
        req: &GenerationRequest,
        out: &mut impl Write,
    ) -> Result<(), GenerateError> {
        let reference = match &req.reference {
            Some(path) => Some(self.load_reference_image(path, out)?),
            None => None,
        };

        self.ensure_output_directory(&req.output, out)?;

        writeln!(out, "Generating image with size: {}...", req.size)?;
        let response = self
            .request_generation(&req.prompt, reference.as_ref(), req.size)
            .await?;

        if self.extract_and_persist_image(&response, &req.output, out)? {
            Ok(())
        } else {
            Err(GenerateError::NoImageProduced)
        }
    }

    /// Reads the file and checks its header for a known image format and
    /// dimensions. PNG, JPEG and WebP bytes are forwarded unchanged, anything
    /// else is re-encoded as PNG first.
    pub fn load_reference_image(
        &self,
        path: &Path,
        out: &mut impl Write,
    ) -> Result<ReferenceImage, GenerateError> {
        let load_error = |reason: String| GenerateError::ReferenceLoad {
            path: path.to_owned(),
            reason,
        };

        let data = self.fs.read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => GenerateError::ReferenceNotFound {
                path: path.to_owned(),
            },
            _ => load_error(e.to_string()),
        })?;

        let reader = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| load_error(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| load_error(format!("cannot identify image file '{}'", path.display())))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| load_error(e.to_string()))?;
        debug!("Reference image is {format:?}, {width}x{height}");

        let (format, data) = if SENDABLE_FORMATS.contains(&format) {
            (format, data)
        } else {
            debug!("Re-encoding {format:?} reference as PNG");
            let image = image::load_from_memory_with_format(&data, format)
                .map_err(|e| load_error(e.to_string()))?;
            let mut buf = Cursor::new(Vec::new());
            image
                .write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| load_error(e.to_string()))?;
            (ImageFormat::Png, buf.into_inner())
        };

        writeln!(out, "Using reference image: {}", path.display())?;
        Ok(ReferenceImage {
            mime_type: format.to_mime_type().to_string(),
            data,
        })
    }

    /// Creates the parent directory of `output` (and its ancestors) if missing.
    pub fn ensure_output_directory(
        &self,
        output: &Path,
        out: &mut impl Write,
    ) -> Result<(), GenerateError> {
        let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return Ok(());
        };
        if self.fs.exists(dir) {
            return Ok(());
        }

        self.fs
            .create_dir_all(dir)
            .map_err(|source| GenerateError::CreateDir {
                path: dir.to_owned(),
                source,
            })?;
        writeln!(out, "Created output directory: {}", dir.display())?;
        Ok(())
    }

    pub async fn request_generation(
        &self,
        prompt: &str,
        reference: Option<&ReferenceImage>,
        size: Size,
    ) -> Result<GenerationResponse, GenerateError> {
        info!(
            "Requesting {size} image from {} (reference: {})",
            self.service.model(),
            reference.is_some()
        );
        self.service
            .generate(prompt, reference, size)
            .await
            .map_err(GenerateError::Service)
    }

    /// Walks the parts in order. Text is echoed; every image part is decoded
    /// and written to `output`, so a later image overwrites an earlier one.
    /// Returns whether anything was written.
    pub fn extract_and_persist_image(
        &self,
        response: &GenerationResponse,
        output: &Path,
        out: &mut impl Write,
    ) -> Result<bool, GenerateError> {
        let mut saved = false;
        for part in &response.parts {
            match part {
                ResponsePart::Text(text) => writeln!(out, "Model response: {text}")?,
                ResponsePart::InlineImage { mime_type, data } => {
                    debug!("Image part ({})", mime_type.as_deref().unwrap_or("no mime type"));
                    let image = decode_inline_image(data)?;
                    let encoded = encode_for_path(&image, output)?;
                    self.fs
                        .write(output, &encoded)
                        .map_err(|source| GenerateError::Write {
                            path: output.to_owned(),
                            source,
                        })?;
                    writeln!(out, "Image saved to: {}", output.display())?;
                    saved = true;
                }
            }
        }
        Ok(saved)
    }
}

pub fn decode_inline_image(data: &str) -> Result<DynamicImage, GenerateError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| GenerateError::ImageDecode(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| GenerateError::ImageDecode(e.to_string()))
}

/// Encodes `image` in the format implied by the extension of `path`.
pub fn encode_for_path(image: &DynamicImage, path: &Path) -> Result<Vec<u8>, GenerateError> {
    let format = ImageFormat::from_path(path).map_err(|_| GenerateError::OutputFormat {
        path: path.to_owned(),
    })?;

    // JPEG has no alpha channel
    let converted;
    let image = if format == ImageFormat::Jpeg && image.color().has_alpha() {
        converted = DynamicImage::ImageRgb8(image.to_rgb8());
        &converted
    } else {
        image
    };

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .map_err(|e| GenerateError::ImageEncode {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    Ok(buf.into_inner())
}
