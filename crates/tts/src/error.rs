use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{backend::BackendError, convert::ConversionError};

pub type Result<T> = std::result::Result<T, TtsError>;

/// Endpoint-level operation, used to pick the message shown for server-side failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Speech,
    Clone,
}

impl Operation {
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Speech => "Failed to generate speech",
            Self::Clone => "Failed to clone voice",
        }
    }
}

/// Speech service errors with appropriate HTTP status codes
#[derive(Debug, Error)]
pub enum TtsError {
    /// Malformed or incomplete request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload exceeds the body limit
    #[error("Request body is too large: {0}")]
    PayloadTooLarge(String),

    /// Language outside the engine's allow-list
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The engine rejected the requested speaker name
    #[error("Unknown speaker: {0}. See GET /voices for the available voices.")]
    UnknownSpeaker(String),

    /// Reference upload could not be written to disk
    #[error("failed to stage reference audio: {0}")]
    Staging(#[source] std::io::Error),

    /// Engine call failed, after any fallback
    #[error("synthesis failed: {0}")]
    Synthesis(#[source] BackendError),

    /// Engine could not be brought up
    #[error("engine initialization failed: {0}")]
    Initialization(#[source] BackendError),

    /// Transcoding to the requested container failed
    #[error("format conversion failed: {0}")]
    Conversion(#[source] ConversionError),

    /// Artifact could not be read back for the response
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Server-side failure already logged at the request boundary
    ///
    /// Only the operation's generic message reaches the client
    #[error("{}", .0.failure_message())]
    Failed(Operation),
}

impl TtsError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnsupportedLanguage(_) | Self::UnknownSpeaker(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Initialization(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Staging(_)
            | Self::Synthesis(_)
            | Self::Conversion(_)
            | Self::Io(_)
            | Self::ConfigError(_)
            | Self::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Get the error type string for the response
    pub const fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_)
            | Self::PayloadTooLarge(_)
            | Self::UnsupportedLanguage(_)
            | Self::UnknownSpeaker(_) => "invalid_request_error",
            Self::Initialization(_) | Self::Synthesis(_) => "engine_error",
            Self::Staging(_)
            | Self::Conversion(_)
            | Self::Io(_)
            | Self::ConfigError(_)
            | Self::Failed(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest(_)
            | Self::PayloadTooLarge(_)
            | Self::UnsupportedLanguage(_)
            | Self::UnknownSpeaker(_)
            | Self::Failed(_) => self.to_string(),
            Self::Initialization(_) => "Speech engine is not available".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}
