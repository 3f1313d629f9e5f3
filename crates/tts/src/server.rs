use std::{path::PathBuf, sync::Arc};

use jiff::Zoned;
use murmur_config::{Config, EngineType};
use tokio::sync::OnceCell;

use crate::{
    backend::{BackendError, SynthesisBackend, coqui_cli::CoquiCliBackend, coqui_server::CoquiServerBackend},
    convert::FormatConverter,
    error::{Operation, TtsError},
    filename::compose_filename,
    format::AudioFormat,
    invoker::Synthesizer,
    retention::RetentionSweeper,
    staging::{self, StagedReference},
    types::{SpeechOutput, SpeechRequest},
    validate::validate_language,
};

/// Download label for cloned voices
const CLONE_LABEL: &str = "cloned";

/// Characters of the request text kept in failure logs
const LOGGED_TEXT_CHARS: usize = 100;

/// Speech pipeline shared by every request
pub struct TtsService {
    backend: Arc<dyn SynthesisBackend>,
    initialized: OnceCell<()>,
    synthesizer: Synthesizer,
    converter: FormatConverter,
    sweeper: RetentionSweeper,
    temp_dir: PathBuf,
    default_language: String,
    default_format: AudioFormat,
    fallback_voices: Vec<String>,
}

impl TtsService {
    /// Build the pipeline around an already constructed engine
    ///
    /// Spawns the retention worker, so this must run inside a tokio runtime.
    pub fn with_backend(backend: Arc<dyn SynthesisBackend>, config: &Config) -> crate::Result<Self> {
        let default_format = AudioFormat::parse(&config.defaults.format)
            .map_err(|_| TtsError::ConfigError(format!("unsupported default format '{}'", config.defaults.format)))?;

        let max_age = config
            .output
            .max_age()
            .map_err(|e| TtsError::ConfigError(e.to_string()))?;

        let sweep_interval = config
            .output
            .sweep_interval()
            .map_err(|e| TtsError::ConfigError(e.to_string()))?;

        let output_dir = config.output.directory.clone();

        Ok(Self {
            synthesizer: Synthesizer::new(backend.clone(), output_dir.clone(), config.defaults.speaker.clone()),
            backend,
            initialized: OnceCell::new(),
            converter: FormatConverter::new(&config.output.ffmpeg_path),
            sweeper: RetentionSweeper::spawn(output_dir, max_age, sweep_interval),
            temp_dir: config.output.temp_directory(),
            default_language: config.defaults.language.clone(),
            default_format,
            fallback_voices: config.engine.voices.clone(),
        })
    }

    /// Warm up the engine. Only the first call reaches it
    pub async fn initialize(&self) -> crate::Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                tracing::info!(engine = self.backend.name(), "initializing speech engine");

                self.backend.initialize().await.map_err(|e| {
                    tracing::error!(engine = self.backend.name(), error = %e, "speech engine initialization failed");
                    TtsError::Initialization(e)
                })?;

                tracing::info!(engine = self.backend.name(), "speech engine initialized");
                Ok::<_, TtsError>(())
            })
            .await?;

        Ok(())
    }

    pub fn engine_name(&self) -> &str {
        self.backend.name()
    }

    /// Voices reported by the engine, or the configured list when it can't answer
    pub async fn voices(&self) -> Vec<String> {
        match self.backend.voices().await {
            Ok(voices) if !voices.is_empty() => voices,
            Ok(_) => {
                tracing::debug!(engine = self.backend.name(), "engine listed no voices, using configured list");
                self.fallback_voices.clone()
            }
            Err(e) => {
                tracing::warn!(engine = self.backend.name(), error = %e, "failed to list voices, using configured list");
                self.fallback_voices.clone()
            }
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.backend.languages().to_vec()
    }

    /// Run one request through the pipeline
    ///
    /// Client mistakes come back with their own message. Every other failure
    /// is logged here and reported as the operation's generic message.
    pub async fn generate(&self, request: SpeechRequest, operation: Operation) -> crate::Result<SpeechOutput> {
        let SpeechRequest {
            text,
            language,
            speaker,
            reference,
            output_format,
        } = request;

        let text = text.ok_or_else(|| TtsError::InvalidRequest("text is required".to_string()))?;

        let language = language.unwrap_or_else(|| self.default_language.clone());
        if !validate_language(&language, self.backend.languages()) {
            return Err(TtsError::UnsupportedLanguage(language));
        }

        let format = match output_format {
            Some(name) => AudioFormat::parse(&name)?,
            None => self.default_format,
        };

        let label = match operation {
            Operation::Speech => speaker.as_deref(),
            Operation::Clone => Some(CLONE_LABEL),
        };

        let failure = |error: TtsError| {
            if error.is_client_error() {
                return error;
            }

            tracing::error!(
                error = %error,
                operation = operation.failure_message(),
                text = %truncate(&text, LOGGED_TEXT_CHARS),
                language = %language,
                speaker = speaker.as_deref(),
                format = %format,
                "speech request failed"
            );
            TtsError::Failed(operation)
        };

        let staged = match reference {
            Some(audio) => Some(
                staging::stage(&self.temp_dir, &audio)
                    .await
                    .map_err(|e| failure(TtsError::Staging(e)))?,
            ),
            None => None,
        };

        let result = self
            .synthesizer
            .synthesize(
                &text,
                &language,
                speaker.as_deref(),
                staged.as_ref().map(StagedReference::path),
            )
            .await;

        let cloning = staged.is_some();
        if let Some(staged) = staged {
            staged.remove().await;
        }

        let named = if cloning { None } else { speaker.as_deref() };
        let artifact = result.map_err(|e| failure(self.synthesis_error(e, named, operation)))?;

        let artifact = self
            .converter
            .convert(artifact, format)
            .await
            .map_err(|e| failure(TtsError::Conversion(e)))?;

        let file = tokio::fs::File::open(&artifact.path)
            .await
            .map_err(|e| failure(TtsError::Io(e)))?;

        Ok(SpeechOutput {
            file,
            format,
            filename: compose_filename(label, format, &Zoned::now()),
        })
    }

    /// Queue a retention sweep of the output directory
    pub fn schedule_sweep(&self) {
        self.sweeper.request_sweep();
    }

    /// `speaker` is only set when the engine was asked for that named voice
    fn synthesis_error(&self, error: BackendError, speaker: Option<&str>, operation: Operation) -> TtsError {
        match speaker {
            Some(speaker) if operation == Operation::Speech && error.is_unknown_speaker() => {
                tracing::info!(speaker, engine = self.backend.name(), "engine rejected speaker");
                TtsError::UnknownSpeaker(speaker.to_string())
            }
            _ => TtsError::Synthesis(error),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Builder for constructing the speech service from configuration
pub struct TtsServiceBuilder<'a> {
    config: &'a Config,
}

impl<'a> TtsServiceBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::Result<TtsService> {
        let engine = &self.config.engine;

        let timeout = engine.timeout().map_err(|e| TtsError::ConfigError(e.to_string()))?;

        tracing::debug!(engine = %engine.engine_type, device = %engine.device, "creating speech engine");

        let backend: Arc<dyn SynthesisBackend> = match engine.engine_type {
            EngineType::CoquiServer => {
                let base_url = engine.base_url.clone().ok_or_else(|| {
                    TtsError::ConfigError("engine.base_url is required for the coqui_server engine".to_string())
                })?;

                Arc::new(
                    CoquiServerBackend::new(base_url, timeout, engine.languages.clone())
                        .map_err(|e| TtsError::ConfigError(e.to_string()))?,
                )
            }
            EngineType::CoquiCli => Arc::new(CoquiCliBackend::new(
                engine.command.clone(),
                engine.model.clone(),
                engine.device,
                timeout,
                engine.languages.clone(),
                engine.voices.clone(),
            )),
        };

        TtsService::with_backend(backend, self.config)
    }
}
