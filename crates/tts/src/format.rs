use strum::{Display, EnumString, VariantNames};

/// Output containers a client can ask for
///
/// The engine always writes [`AudioFormat::NATIVE`]; everything else is
/// transcoded after synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Flac,
}

impl AudioFormat {
    /// Container the engine produces directly
    pub const NATIVE: Self = Self::Wav;

    /// Parse a client-supplied format name
    ///
    /// # Errors
    ///
    /// Returns [`crate::TtsError::InvalidRequest`] for names outside the supported set
    pub fn parse(name: &str) -> crate::Result<Self> {
        name.trim().parse().map_err(|_| {
            crate::TtsError::InvalidRequest(format!(
                "Unsupported output format: {name}. Expected one of: {}",
                Self::VARIANTS.join(", ")
            ))
        })
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }
}
