use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};
use url::Url;

/// Languages the XTTS v2 model family accepts
pub const XTTS_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh-cn", "ja", "hu", "ko", "hi",
];

/// Studio speakers shipped with XTTS v2, used when the engine cannot list its own
pub const XTTS_VOICES: &[&str] = &[
    "Claribel Dervla",
    "Daisy Studious",
    "Gracie Wise",
    "Tammie Ema",
    "Ana Florence",
    "Annmarie Nele",
    "Asya Anara",
    "Brenda Stern",
    "Gitta Nikolina",
    "Henriette Usha",
    "Sofia Hellen",
    "Tanja Adelina",
    "Vjollca Johnnie",
    "Andrew Chipper",
    "Badr Odhiambo",
];

/// Synthesis engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Which engine integration to use
    #[serde(rename = "type", default)]
    pub engine_type: EngineType,
    /// Model identifier passed to the engine
    #[serde(default = "default_model")]
    pub model: String,
    /// Compute device the engine runs on
    #[serde(default)]
    pub device: Device,
    /// Base URL of the inference server (`coqui_server` only)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Executable to run (`coqui_cli` only)
    #[serde(default = "default_command")]
    pub command: String,
    /// Upper bound for a single synthesis call (e.g. "120s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Language allow-list reported by the engine
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Voice list reported when the engine cannot enumerate speakers
    #[serde(default = "default_voices")]
    pub voices: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_type: EngineType::default(),
            model: default_model(),
            device: Device::default(),
            base_url: None,
            command: default_command(),
            timeout: default_timeout(),
            languages: default_languages(),
            voices: default_voices(),
        }
    }
}

impl EngineConfig {
    /// Parsed synthesis timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is not a valid duration string
    pub fn timeout(&self) -> anyhow::Result<std::time::Duration> {
        crate::output::parse_duration("engine.timeout", &self.timeout)
    }
}

/// Supported engine integrations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EngineType {
    /// Coqui `tts` command line, one process per request
    #[default]
    CoquiCli,
    /// Coqui `tts-server` over HTTP
    CoquiServer,
}

/// Compute device for the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

fn default_model() -> String {
    "tts_models/multilingual/multi-dataset/xtts_v2".to_string()
}

fn default_command() -> String {
    "tts".to_string()
}

fn default_timeout() -> String {
    "120s".to_string()
}

fn default_languages() -> Vec<String> {
    XTTS_LANGUAGES.iter().map(ToString::to_string).collect()
}

fn default_voices() -> Vec<String> {
    XTTS_VOICES.iter().map(ToString::to_string).collect()
}
