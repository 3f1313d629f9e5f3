//! Scripted engine for pipeline and router tests

use std::{
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::backend::{BackendError, BackendRequest, SynthesisBackend, Voice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Named(String),
    Clone(PathBuf),
}

pub(crate) struct ScriptedBackend {
    named_error: Option<String>,
    clone_error: Option<String>,
    voices: Option<Vec<String>>,
    languages: Vec<String>,
    calls: Mutex<Vec<Call>>,
    initializations: AtomicUsize,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            named_error: None,
            clone_error: None,
            voices: Some(vec!["Daisy Studious".to_string(), "Gracie Wise".to_string()]),
            languages: ["en", "es", "de"].map(String::from).to_vec(),
            calls: Mutex::new(Vec::new()),
            initializations: AtomicUsize::new(0),
        }
    }
}

impl ScriptedBackend {
    pub(crate) fn failing_named(message: &str) -> Self {
        Self {
            named_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn failing_clone(message: &str) -> Self {
        Self {
            clone_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn failing_all(clone_message: &str, named_message: &str) -> Self {
        Self {
            named_error: Some(named_message.to_string()),
            clone_error: Some(clone_message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn without_voice_listing() -> Self {
        Self {
            voices: None,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisBackend for ScriptedBackend {
    async fn initialize(&self) -> Result<(), BackendError> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn synthesize(&self, request: &BackendRequest<'_>) -> Result<(), BackendError> {
        let (call, error) = match request.voice {
            Voice::Named(speaker) => (Call::Named(speaker.to_string()), &self.named_error),
            Voice::Clone(reference) => (Call::Clone(reference.to_path_buf()), &self.clone_error),
        };
        self.calls.lock().unwrap().push(call);

        if let Some(message) = error {
            return Err(BackendError::Process(message.clone()));
        }

        tokio::fs::write(request.output, format!("RIFF{}", request.text)).await?;
        Ok(())
    }

    async fn voices(&self) -> Result<Vec<String>, BackendError> {
        self.voices
            .clone()
            .ok_or_else(|| BackendError::Connection("engine offline".to_string()))
    }

    fn languages(&self) -> &[String] {
        &self.languages
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
