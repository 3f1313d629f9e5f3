#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod artifact;
pub mod backend;
pub mod convert;
mod error;
pub mod filename;
pub mod format;
mod invoker;
mod request;
pub mod retention;
mod server;
pub mod staging;
#[cfg(test)]
mod testing;
mod types;
pub mod validate;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};

pub use error::{Operation, Result, TtsError};
pub use invoker::Synthesizer;
pub use request::SpeechForm;
pub use server::{TtsService, TtsServiceBuilder};
pub use types::{LanguagesResponse, SpeechOutput, SpeechRequest, VoicesResponse};

/// Body limit for reference uploads (32 MiB)
pub const BODY_LIMIT_BYTES: usize = 32 << 20;

/// Build the speech service from configuration
pub fn build_server(config: &murmur_config::Config) -> anyhow::Result<Arc<TtsService>> {
    let service = Arc::new(
        TtsServiceBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS service: {e}"))?,
    );
    Ok(service)
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<TtsService>> {
    Router::new()
        .route("/tts", post(text_to_speech))
        .route("/clone", post(clone_voice))
        .route("/voices", get(voices))
        .route("/languages", get(languages))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// Synthesize with a named voice, or clone an uploaded `speaker_wav`
async fn text_to_speech(State(service): State<Arc<TtsService>>, form: SpeechForm) -> Result<SpeechOutput> {
    tracing::debug!(speaker = form.speaker.as_deref(), cloning = form.speaker_wav.is_some(), "speech handler called");

    let request = SpeechRequest {
        text: form.text,
        language: form.language,
        speaker: form.speaker,
        reference: form.speaker_wav,
        output_format: form.output_format,
    };

    let output = service.generate(request, Operation::Speech).await?;
    service.schedule_sweep();

    Ok(output)
}

/// Synthesize in the voice of the uploaded `file`
async fn clone_voice(State(service): State<Arc<TtsService>>, form: SpeechForm) -> Result<SpeechOutput> {
    let Some(reference) = form.file else {
        return Err(TtsError::InvalidRequest(
            "file is required and must not be empty".to_string(),
        ));
    };

    tracing::debug!(reference_bytes = reference.len(), "clone handler called");

    let request = SpeechRequest {
        text: form.text,
        language: form.language,
        speaker: None,
        reference: Some(reference),
        output_format: form.output_format,
    };

    let output = service.generate(request, Operation::Clone).await?;
    service.schedule_sweep();

    Ok(output)
}

async fn voices(State(service): State<Arc<TtsService>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: service.voices().await,
    })
}

async fn languages(State(service): State<Arc<TtsService>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: service.languages(),
    })
}
