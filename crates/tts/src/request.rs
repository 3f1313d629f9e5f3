use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header},
};
use bytes::Bytes;
use serde::Deserialize;

use crate::error::TtsError;

/// Fields accepted by `/tts` and `/clone`
///
/// Read from `multipart/form-data` or `application/x-www-form-urlencoded`.
/// Uploads are only possible with multipart. Empty values and empty uploads
/// count as absent.
#[derive(Debug, Default)]
pub struct SpeechForm {
    pub text: Option<String>,
    pub language: Option<String>,
    pub speaker: Option<String>,
    pub output_format: Option<String>,
    /// Reference upload on `/tts`
    pub speaker_wav: Option<Bytes>,
    /// Reference upload on `/clone`
    pub file: Option<Bytes>,
}

/// Urlencoded body; reference fields can only name a path, never carry audio
#[derive(Deserialize)]
struct UrlencodedForm {
    text: Option<String>,
    language: Option<String>,
    speaker: Option<String>,
    output_format: Option<String>,
    speaker_wav: Option<String>,
    file: Option<String>,
}

impl TryFrom<UrlencodedForm> for SpeechForm {
    type Error = TtsError;

    fn try_from(form: UrlencodedForm) -> Result<Self, Self::Error> {
        for (name, value) in [("speaker_wav", form.speaker_wav), ("file", form.file)] {
            if value.and_then(non_empty).is_some() {
                return Err(not_uploaded(name));
            }
        }

        Ok(Self {
            text: form.text.and_then(non_empty),
            language: form.language.and_then(non_empty),
            speaker: form.speaker.and_then(non_empty),
            output_format: form.output_format.and_then(non_empty),
            speaker_wav: None,
            file: None,
        })
    }
}

impl SpeechForm {
    fn set_text(&mut self, name: &str, value: String) {
        let value = non_empty(value);

        match name {
            "text" => self.text = value,
            "language" => self.language = value,
            "speaker" => self.speaker = value,
            "output_format" => self.output_format = value,
            _ => tracing::debug!(field = name, "ignoring unknown form field"),
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> crate::Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "speaker_wav" || name == "file" {
                let uploaded = field.file_name().is_some();
                let audio = field.bytes().await.map_err(multipart_error)?;

                if audio.is_empty() {
                    continue;
                }

                if !uploaded {
                    return Err(not_uploaded(&name));
                }

                if name == "file" {
                    form.file = Some(audio);
                } else {
                    form.speaker_wav = Some(audio);
                }
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.set_text(&name, value);
            }
        }

        Ok(form)
    }
}

impl<S> FromRequest<S> for SpeechForm
where
    S: Send + Sync,
{
    type Rejection = TtsError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "multipart/form-data" => {
                let multipart = Multipart::from_request(request, state)
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;

                Self::from_multipart(multipart).await
            }
            "application/x-www-form-urlencoded" => {
                let Form(form) = Form::<UrlencodedForm>::from_request(request, state)
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;

                Self::try_from(form)
            }
            _ => Err(TtsError::InvalidRequest(
                "Unsupported Content-Type, expected multipart/form-data or application/x-www-form-urlencoded"
                    .to_string(),
            )),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

fn not_uploaded(name: &str) -> TtsError {
    TtsError::InvalidRequest(format!("{name} must be an uploaded audio file"))
}

fn multipart_error(e: MultipartError) -> TtsError {
    rejection(e.status(), e.body_text())
}

fn rejection(status: StatusCode, message: String) -> TtsError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        TtsError::PayloadTooLarge(message)
    } else {
        TtsError::InvalidRequest(message)
    }
}
