use axum::{
    body::Body,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::{filename::content_disposition, format::AudioFormat};

/// One synthesis request, after form decoding
///
/// Blank form values arrive here as `None`.
#[derive(Debug, Default, Clone)]
pub struct SpeechRequest {
    /// Text to synthesize
    pub text: Option<String>,
    /// Language code, the configured default when absent
    pub language: Option<String>,
    /// Built-in speaker name
    pub speaker: Option<String>,
    /// Reference recording for voice cloning
    pub reference: Option<Bytes>,
    /// Output container name, the configured default when absent
    pub output_format: Option<String>,
}

/// Finished audio ready to be streamed back
#[derive(Debug)]
pub struct SpeechOutput {
    pub file: tokio::fs::File,
    pub format: AudioFormat,
    /// Download name for `Content-Disposition`
    pub filename: String,
}

impl IntoResponse for SpeechOutput {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::try_from(content_disposition(&self.filename))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(self.format.mime_type())),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from_stream(ReaderStream::new(self.file)),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
}
