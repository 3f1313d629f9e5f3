use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    artifact::{SynthesisArtifact, unique_file_name},
    backend::{BackendError, BackendRequest, SynthesisBackend, Voice},
    format::AudioFormat,
};

/// Drives the engine for one request and owns the fallback policy
///
/// A failed cloning attempt is retried once with the default named voice. A
/// failed named-voice attempt is final.
pub struct Synthesizer {
    backend: Arc<dyn SynthesisBackend>,
    output_dir: PathBuf,
    default_speaker: String,
}

impl Synthesizer {
    pub fn new(backend: Arc<dyn SynthesisBackend>, output_dir: PathBuf, default_speaker: String) -> Self {
        Self {
            backend,
            output_dir,
            default_speaker,
        }
    }

    /// Synthesize `text` into a fresh WAV file in the output directory
    ///
    /// With a reference sample the engine clones that voice; otherwise it uses
    /// `speaker`, or the default speaker when none is given. If cloning and the
    /// fallback both fail, the cloning error is returned.
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        speaker: Option<&str>,
        reference: Option<&Path>,
    ) -> Result<SynthesisArtifact, BackendError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let output = self
            .output_dir
            .join(unique_file_name("tts", AudioFormat::NATIVE.extension()));

        tracing::info!(
            engine = self.backend.name(),
            text_length = text.chars().count(),
            language,
            speaker,
            "generating speech"
        );

        match reference {
            Some(reference) => self.clone_with_fallback(text, language, reference, &output).await?,
            None => {
                let speaker = speaker.unwrap_or(&self.default_speaker);
                self.attempt(text, language, Voice::Named(speaker), &output).await?;
            }
        }

        Ok(SynthesisArtifact {
            path: output,
            format: AudioFormat::NATIVE,
        })
    }

    async fn clone_with_fallback(
        &self,
        text: &str,
        language: &str,
        reference: &Path,
        output: &Path,
    ) -> Result<(), BackendError> {
        let Err(clone_error) = self.attempt(text, language, Voice::Clone(reference), output).await else {
            return Ok(());
        };

        tracing::warn!(
            error = %clone_error,
            fallback_speaker = %self.default_speaker,
            "voice cloning failed, retrying with default speaker"
        );

        match self
            .attempt(text, language, Voice::Named(&self.default_speaker), output)
            .await
        {
            Ok(()) => {
                tracing::info!(output = %output.display(), "speech generated with fallback speaker");
                Ok(())
            }
            Err(fallback_error) => {
                tracing::error!(error = %fallback_error, "fallback synthesis also failed");
                Err(clone_error)
            }
        }
    }

    async fn attempt(&self, text: &str, language: &str, voice: Voice<'_>, output: &Path) -> Result<(), BackendError> {
        match voice {
            Voice::Named(speaker) => tracing::debug!(speaker, "synthesizing with named voice"),
            Voice::Clone(reference) => {
                tracing::debug!(reference = %reference.display(), "synthesizing with voice cloning");
            }
        }

        let request = BackendRequest {
            text,
            language,
            voice,
            output,
        };

        match self.backend.synthesize(&request).await {
            Ok(()) => {
                tracing::info!(output = %output.display(), "speech generated");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, engine = self.backend.name(), "speech generation failed");
                Err(e)
            }
        }
    }
}
