pub mod coqui_cli;
pub mod coqui_server;

use std::{path::Path, time::Duration};

use async_trait::async_trait;

/// Voice selection for a single engine call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice<'a> {
    /// One of the engine's built-in speakers
    Named(&'a str),
    /// Clone the timbre of a reference recording
    Clone(&'a Path),
}

/// One synthesis call. The engine writes a WAV file to `output`
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    pub text: &'a str,
    pub language: &'a str,
    pub voice: Voice<'a>,
    pub output: &'a Path,
}

/// Failure reported by a synthesis engine
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Engine could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    /// Engine answered with an error status
    #[error("engine returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Engine process failed to start or exited unsuccessfully
    #[error("engine process failed: {0}")]
    Process(String),

    #[error("engine did not finish within {0:?}")]
    Timeout(Duration),

    #[error("engine produced no audio")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Whether the engine rejected the speaker name rather than failing outright
    pub fn is_unknown_speaker(&self) -> bool {
        let message = match self {
            Self::Api { message, .. } | Self::Process(message) => message.to_ascii_lowercase(),
            _ => return false,
        };

        message.contains("speaker") && ["not found", "not in", "unknown", "invalid"].iter().any(|m| message.contains(m))
    }
}

/// Text-to-speech engine the pipeline delegates to
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// One-time warm-up, called before the first request is served
    async fn initialize(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Synthesize `request.text` into a WAV file at `request.output`
    ///
    /// A retry with the same output path overwrites the previous attempt.
    async fn synthesize(&self, request: &BackendRequest<'_>) -> Result<(), BackendError>;

    /// Built-in speakers the engine knows about
    async fn voices(&self) -> Result<Vec<String>, BackendError>;

    /// Language codes the engine accepts
    fn languages(&self) -> &[String];

    /// Engine name for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_unknown_speaker_messages() {
        let err = BackendError::Api {
            status: 500,
            message: "Speaker 'Nobody' not found in the model".to_string(),
        };
        assert!(err.is_unknown_speaker());

        let err = BackendError::Process("KeyError: speaker Nobody is not in speaker manager".to_string());
        assert!(err.is_unknown_speaker());
    }

    #[test]
    fn other_failures_are_not_speaker_errors() {
        assert!(!BackendError::Process("CUDA out of memory".to_string()).is_unknown_speaker());
        assert!(!BackendError::Timeout(Duration::from_secs(1)).is_unknown_speaker());
        assert!(
            !BackendError::Api {
                status: 500,
                message: "speaker embedding computed".to_string()
            }
            .is_unknown_speaker()
        );
    }
}
