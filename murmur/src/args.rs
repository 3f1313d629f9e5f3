use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use murmur_config::{AuthConfig, Config, Device, EngineType};
use secrecy::SecretString;

/// Murmur text-to-speech service
///
/// Settings come from the optional config file, then from these flags or
/// their environment variables.
#[derive(Debug, Parser)]
#[command(name = "murmur", about = "HTTP text-to-speech and voice cloning service")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "MURMUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Synthesis engine (coqui_cli or coqui_server)
    #[arg(long, env = "TTS_ENGINE")]
    pub engine: Option<EngineType>,

    /// Model identifier passed to the engine
    #[arg(long, env = "MODEL_NAME")]
    pub model: Option<String>,

    /// Inference device (cpu or cuda)
    #[arg(long, env = "DEVICE")]
    pub device: Option<Device>,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<IpAddr>,

    /// Port to bind
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory for generated audio
    #[arg(long, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, env = "DEFAULT_LANGUAGE")]
    pub default_language: Option<String>,

    #[arg(long, env = "DEFAULT_SPEAKER")]
    pub default_speaker: Option<String>,

    #[arg(long, env = "DEFAULT_FORMAT")]
    pub default_format: Option<String>,

    /// Require this key on every non-public route
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log at debug level
    #[arg(long, env = "DEBUG")]
    pub debug: bool,
}

impl Args {
    /// Load the config file if one was given, otherwise start from defaults
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        self.apply_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Overlay flag and environment values onto `config`
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(engine) = self.engine {
            config.engine.engine_type = engine;
        }
        if let Some(model) = &self.model {
            config.engine.model.clone_from(model);
        }
        if let Some(device) = self.device {
            config.engine.device = device;
        }

        let current = config.server.listen_address;
        config.server.listen_address = SocketAddr::new(
            self.host.unwrap_or_else(|| current.ip()),
            self.port.unwrap_or_else(|| current.port()),
        );

        if let Some(dir) = &self.output_dir {
            config.output.directory.clone_from(dir);
        }
        if let Some(language) = &self.default_language {
            config.defaults.language.clone_from(language);
        }
        if let Some(speaker) = &self.default_speaker {
            config.defaults.speaker.clone_from(speaker);
        }
        if let Some(format) = &self.default_format {
            config.defaults.format.clone_from(format);
        }

        if let Some(key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
            config.auth.get_or_insert_with(AuthConfig::default).api_key = Some(SecretString::from(key));
        }
    }

    pub const fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
