//! Mock Coqui TTS server for integration tests
//!
//! Answers `/api/tts` with fake WAV bytes that echo the request, so tests can
//! tell which voice produced the audio.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing,
};
use tokio_util::sync::CancellationToken;

/// Speaker name the mock refuses, the way Coqui does for unknown speakers
pub const UNKNOWN_SPEAKER: &str = "Nobody";

/// Reference sample content the mock cannot clone
pub const BROKEN_REFERENCE: &[u8] = b"BROKEN";

pub struct MockCoqui {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockCoquiState>,
}

#[derive(Default)]
struct MockCoquiState {
    named_requests: AtomicU32,
    clone_requests: AtomicU32,
    speakers: Mutex<Vec<String>>,
    /// Answer `/api/speakers` with an error
    fail_speakers: bool,
}

impl MockCoqui {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(false).await
    }

    /// Start a mock whose speaker listing always fails
    pub async fn start_without_speakers() -> anyhow::Result<Self> {
        Self::start_inner(true).await
    }

    async fn start_inner(fail_speakers: bool) -> anyhow::Result<Self> {
        let state = Arc::new(MockCoquiState {
            speakers: Mutex::new(vec!["Mock Speaker".to_owned(), "Daisy Studious".to_owned()]),
            fail_speakers,
            ..MockCoquiState::default()
        });

        let app = Router::new()
            .route("/", routing::get(|| async { "coqui" }))
            .route("/api/tts", routing::get(handle_named).post(handle_clone))
            .route("/api/speakers", routing::get(handle_speakers))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn named_requests(&self) -> u32 {
        self.state.named_requests.load(Ordering::SeqCst)
    }

    pub fn clone_requests(&self) -> u32 {
        self.state.clone_requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockCoqui {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_named(
    State(state): State<Arc<MockCoquiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.named_requests.fetch_add(1, Ordering::SeqCst);

    let speaker = params.get("speaker_id").cloned().unwrap_or_default();
    if speaker == UNKNOWN_SPEAKER {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Speaker {speaker} not found in the model's speaker manager"),
        )
            .into_response();
    }

    let text = params.get("text").cloned().unwrap_or_default();
    let language = params.get("language_id").cloned().unwrap_or_default();

    format!("RIFF|named|{speaker}|{language}|{text}").into_response()
}

async fn handle_clone(State(state): State<Arc<MockCoquiState>>, mut multipart: Multipart) -> Response {
    state.clone_requests.fetch_add(1, Ordering::SeqCst);

    let mut text = String::new();
    let mut reference = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "text" => text = field.text().await.unwrap_or_default(),
            "speaker_wav" => reference = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default(),
            _ => {}
        }
    }

    if reference.is_empty() || reference == BROKEN_REFERENCE {
        return (StatusCode::INTERNAL_SERVER_ERROR, "could not compute speaker embedding").into_response();
    }

    format!("RIFF|clone|{}|{text}", reference.len()).into_response()
}

async fn handle_speakers(State(state): State<Arc<MockCoquiState>>) -> Response {
    if state.fail_speakers {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no speaker manager").into_response();
    }

    let speakers = state.speakers.lock().map(|s| s.clone()).unwrap_or_default();
    Json(speakers).into_response()
}
