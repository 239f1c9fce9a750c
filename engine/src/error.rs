use std::{io, path::PathBuf};

use color_eyre::Report;
use thiserror::Error;

/// Every way a generation run can end early. All of them are terminal.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(
        "Error: GEMINI_API_KEY environment variable not set.\nSet it with: export GEMINI_API_KEY='your-api-key'"
    )]
    MissingCredential,

    #[error("Error: Reference image '{}' not found.", path.display())]
    ReferenceNotFound { path: PathBuf },

    #[error("Error loading reference image: {reason}")]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("Error generating image: {0:#}")]
    Service(Report),

    #[error("Warning: No image was generated in the response.")]
    NoImageProduced,

    #[error("Error decoding generated image: {0}")]
    ImageDecode(String),

    #[error("Error: Can't infer an image format from output path '{}'.", path.display())]
    OutputFormat { path: PathBuf },

    #[error("Error encoding image for '{}': {reason}", path.display())]
    ImageEncode { path: PathBuf, reason: String },

    #[error("Error creating output directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Error writing '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Error loading settings: {0:#}")]
    Settings(Report),

    #[error(transparent)]
    Console(#[from] io::Error),
}

impl GenerateError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;
    use expect_test::expect;

    use super::*;

    #[test]
    fn missing_credential_has_remediation_line() {
        expect![[r#"
            Error: GEMINI_API_KEY environment variable not set.
            Set it with: export GEMINI_API_KEY='your-api-key'"#]]
        .assert_eq(&GenerateError::MissingCredential.to_string());
    }

    #[test]
    fn reference_not_found_names_the_file() {
        let err = GenerateError::ReferenceNotFound {
            path: "refs/missing.png".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error: Reference image 'refs/missing.png' not found."
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn no_image_is_a_warning() {
        expect!["Warning: No image was generated in the response."]
            .assert_eq(&GenerateError::NoImageProduced.to_string());
    }

    #[test]
    fn reference_load_shows_the_reason() {
        let err = GenerateError::ReferenceLoad {
            path: "style.png".into(),
            reason: "cannot identify image file 'style.png'".into(),
        };
        expect!["Error loading reference image: cannot identify image file 'style.png'"]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn service_error_carries_the_whole_chain() {
        let err = GenerateError::Service(eyre!("401 Unauthorized").wrap_err("request failed"));
        assert_eq!(
            err.to_string(),
            "Error generating image: request failed: 401 Unauthorized"
        );
    }
}
