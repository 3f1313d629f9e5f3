use std::{ffi::OsString, process::Stdio, time::Duration};

use async_trait::async_trait;
use murmur_config::Device;
use tokio::process::Command;

use super::{BackendError, BackendRequest, SynthesisBackend, Voice};

/// Lines of stderr kept when the process fails
const STDERR_TAIL_LINES: usize = 3;

/// Coqui `tts` command line, one process per call
pub struct CoquiCliBackend {
    command: String,
    model: String,
    device: Device,
    timeout: Duration,
    languages: Vec<String>,
    voices: Vec<String>,
}

impl CoquiCliBackend {
    pub const fn new(
        command: String,
        model: String,
        device: Device,
        timeout: Duration,
        languages: Vec<String>,
        voices: Vec<String>,
    ) -> Self {
        Self {
            command,
            model,
            device,
            timeout,
            languages,
            voices,
        }
    }

    fn synthesis_args(&self, request: &BackendRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--model_name".into(),
            self.model.clone().into(),
            "--text".into(),
            request.text.into(),
            "--language_idx".into(),
            request.language.into(),
            "--out_path".into(),
            request.output.into(),
            "--device".into(),
            self.device.as_ref().into(),
        ];

        match request.voice {
            Voice::Named(speaker) => args.extend(["--speaker_idx".into(), speaker.into()]),
            Voice::Clone(reference) => args.extend(["--speaker_wav".into(), reference.into()]),
        }

        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), BackendError> {
        let mut command = Command::new(&self.command);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))?
            .map_err(|e| BackendError::Process(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            return Err(BackendError::Process(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        Ok(())
    }
}

/// Last few non-empty stderr lines, where Python puts the exception message
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join(" | ")
}

#[async_trait]
impl SynthesisBackend for CoquiCliBackend {
    async fn initialize(&self) -> Result<(), BackendError> {
        tracing::debug!(command = %self.command, "checking coqui cli");
        self.run(vec!["--help".into()]).await
    }

    async fn synthesize(&self, request: &BackendRequest<'_>) -> Result<(), BackendError> {
        self.run(self.synthesis_args(request)).await?;

        let written = tokio::fs::metadata(request.output).await?;
        if written.len() == 0 {
            return Err(BackendError::EmptyOutput);
        }

        tracing::debug!(bytes = written.len(), "coqui cli synthesis complete");

        Ok(())
    }

    async fn voices(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.voices.clone())
    }

    fn languages(&self) -> &[String] {
        &self.languages
    }

    fn name(&self) -> &str {
        "coqui_cli"
    }
}
