use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Gemini `generateContent` endpoint
#[derive(Debug, Error)]
pub enum GeminiApiError {
    #[error("Invalid argument (400): {message}")]
    InvalidArgument { message: String },

    #[error("Failed precondition (400): {message}")]
    FailedPrecondition { message: String },

    #[error("Authentication error (401): {message}")]
    Unauthenticated { message: String },

    #[error("Permission denied (403): {message}")]
    PermissionDenied { message: String },

    #[error("Not found (404): {message}")]
    NotFound { message: String },

    #[error("Resource exhausted (429): {message}")]
    ResourceExhausted { message: String },

    #[error("Internal API error (500): {message}")]
    Internal { message: String },

    #[error("Service unavailable (503): {message}")]
    Unavailable { message: String },

    #[error("Deadline exceeded (504): {message}")]
    DeadlineExceeded { message: String },

    /// Catch-all for unknown statuses and bodies that aren't an error envelope
    #[error("Unexpected API error ({code}): {message}")]
    Unexpected {
        code: u16,
        status: String,
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiApiError {
    pub fn from_status(code: u16, status: &str, message: impl Into<String>) -> Self {
        let message = message.into();

        match status {
            "INVALID_ARGUMENT" => Self::InvalidArgument { message },
            "FAILED_PRECONDITION" => Self::FailedPrecondition { message },
            "UNAUTHENTICATED" => Self::Unauthenticated { message },
            "PERMISSION_DENIED" => Self::PermissionDenied { message },
            "NOT_FOUND" => Self::NotFound { message },
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted { message },
            "INTERNAL" => Self::Internal { message },
            "UNAVAILABLE" => Self::Unavailable { message },
            "DEADLINE_EXCEEDED" => Self::DeadlineExceeded { message },
            other => Self::Unexpected {
                code,
                status: other.to_string(),
                message,
            },
        }
    }

    /// Builds the error from an HTTP status code and the raw response body.
    pub fn from_response(code: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => Self::from_status(code, &error.status, error.message),
            Err(_) => Self::Unexpected {
                code,
                status: String::new(),
                message: body.to_string(),
            },
        }
    }
}
