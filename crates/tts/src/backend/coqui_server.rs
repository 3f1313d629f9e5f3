use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    multipart::{Form, Part},
};
use url::Url;

use super::{BackendError, BackendRequest, SynthesisBackend, Voice};

/// Coqui `tts-server` reached over HTTP
///
/// Named voices use `GET /api/tts`, cloning posts the reference sample to the
/// same path as multipart form data. Both answer with WAV bytes.
pub struct CoquiServerBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
    languages: Vec<String>,
}

impl CoquiServerBackend {
    pub fn new(mut base_url: Url, timeout: Duration, languages: Vec<String>) -> Result<Self, BackendError> {
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| BackendError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
            languages,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Connection(format!("invalid engine URL for '{path}': {e}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout)
            } else {
                BackendError::Connection(format!("failed to reach engine: {e}"))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SynthesisBackend for CoquiServerBackend {
    async fn initialize(&self) -> Result<(), BackendError> {
        let url = self.endpoint("")?;
        tracing::debug!(%url, "probing coqui server");

        self.send(self.client.get(url)).await?;
        Ok(())
    }

    async fn synthesize(&self, request: &BackendRequest<'_>) -> Result<(), BackendError> {
        let url = self.endpoint("api/tts")?;

        let builder = match request.voice {
            Voice::Named(speaker) => self.client.get(url).query(&[
                ("text", request.text),
                ("language_id", request.language),
                ("speaker_id", speaker),
            ]),
            Voice::Clone(reference) => {
                let sample = tokio::fs::read(reference).await?;
                let part = Part::bytes(sample)
                    .file_name("reference.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| BackendError::Connection(format!("invalid reference part: {e}")))?;

                let form = Form::new()
                    .text("text", request.text.to_owned())
                    .text("language_id", request.language.to_owned())
                    .part("speaker_wav", part);

                self.client.post(url).multipart(form)
            }
        };

        let audio = self
            .send(builder)
            .await?
            .bytes()
            .await
            .map_err(|e| BackendError::Connection(format!("failed to read engine response: {e}")))?;

        if audio.is_empty() {
            return Err(BackendError::EmptyOutput);
        }

        tokio::fs::write(request.output, &audio).await?;

        tracing::debug!(bytes = audio.len(), "coqui server synthesis complete");

        Ok(())
    }

    async fn voices(&self) -> Result<Vec<String>, BackendError> {
        let url = self.endpoint("api/speakers")?;

        self.send(self.client.get(url))
            .await?
            .json::<Vec<String>>()
            .await
            .map_err(|e| BackendError::Connection(format!("invalid speaker list: {e}")))
    }

    fn languages(&self) -> &[String] {
        &self.languages
    }

    fn name(&self) -> &str {
        "coqui_server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let backend = CoquiServerBackend::new(
            "http://engine.local:5002/coqui".parse().unwrap(),
            Duration::from_secs(5),
            vec!["en".to_string()],
        )
        .unwrap();

        assert_eq!(
            backend.endpoint("api/tts").unwrap().as_str(),
            "http://engine.local:5002/coqui/api/tts"
        );
    }
}
