use std::{
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use tokio::process::Command;

use crate::{artifact::SynthesisArtifact, format::AudioFormat};

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("failed to run ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Transcodes engine output into the container the client asked for
#[derive(Debug, Clone)]
pub struct FormatConverter {
    ffmpeg_path: PathBuf,
}

impl FormatConverter {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    /// Convert `artifact` into `target`, next to the original
    ///
    /// The original is deleted once the conversion succeeds. On failure it is
    /// left in place and any partial output is removed.
    pub async fn convert(
        &self,
        artifact: SynthesisArtifact,
        target: AudioFormat,
    ) -> Result<SynthesisArtifact, ConversionError> {
        if artifact.format == target {
            return Ok(artifact);
        }

        let output = artifact.path.with_extension(target.extension());

        tracing::debug!(
            input = %artifact.path.display(),
            output = %output.display(),
            format = %target,
            "converting audio"
        );

        if let Err(e) = self.run(&artifact.path, &output, target).await {
            if let Err(cleanup) = tokio::fs::remove_file(&output).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(path = %output.display(), error = %cleanup, "failed to remove partial conversion output");
            }
            return Err(e);
        }

        if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
            tracing::warn!(path = %artifact.path.display(), error = %e, "failed to remove intermediate audio");
        }

        Ok(SynthesisArtifact {
            path: output,
            format: target,
        })
    }

    async fn run(&self, input: &Path, output: &Path, target: AudioFormat) -> Result<(), ConversionError> {
        let result = Command::new(&self.ffmpeg_path)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(codec_args(target))
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ConversionError::Spawn)?;

        if result.status.success() {
            return Ok(());
        }

        Err(ConversionError::Failed {
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        })
    }
}

fn codec_args(target: AudioFormat) -> &'static [&'static str] {
    match target {
        AudioFormat::Mp3 => &["-codec:a", "libmp3lame", "-q:a", "2"],
        AudioFormat::Ogg => &["-codec:a", "libvorbis"],
        AudioFormat::Flac => &["-codec:a", "flac"],
        AudioFormat::Wav => &[],
    }
}
