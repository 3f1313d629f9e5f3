//! Programmatic configuration builder for integration tests

use std::{net::SocketAddr, path::Path};

use murmur_config::{AuthConfig, Config, EngineType};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Coqui server engine at `engine_url`, writing into `output_dir`
    ///
    /// Responses default to WAV so no ffmpeg is needed.
    pub fn new(engine_url: &str, output_dir: &Path) -> Self {
        let mut config = Config::default();

        config.server.listen_address = SocketAddr::from(([127, 0, 0, 1], 0));
        config.engine.engine_type = EngineType::CoquiServer;
        config.engine.base_url = Some(engine_url.parse().expect("valid URL"));
        config.engine.timeout = "5s".to_owned();
        config.output.directory = output_dir.to_path_buf();
        config.output.ffmpeg_path = "/nonexistent/ffmpeg".to_owned();
        config.defaults.format = "wav".to_owned();

        Self { config }
    }

    /// Require an API key on non-public routes
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.auth = Some(AuthConfig {
            api_key: Some(SecretString::from(key)),
            ..AuthConfig::default()
        });
        self
    }

    pub fn with_default_format(mut self, format: &str) -> Self {
        format.clone_into(&mut self.config.defaults.format);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
