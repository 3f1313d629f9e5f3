use serde::Deserialize;

/// Values substituted for form fields the client leaves out
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Language code used when the request has none
    #[serde(default = "default_language")]
    pub language: String,
    /// Named voice used when neither a speaker nor a reference sample is given,
    /// and as the fallback voice when cloning fails
    #[serde(default = "default_speaker")]
    pub speaker: String,
    /// Output container used when the request has none
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            speaker: default_speaker(),
            format: default_format(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_speaker() -> String {
    "Daisy Studious".to_string()
}

fn default_format() -> String {
    "mp3".to_string()
}
