use std::path::Path;

use secrecy::ExposeSecret;

use crate::{Config, EngineType};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text, expanding placeholders first
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_engine()?;
        self.validate_defaults()?;
        self.validate_output()?;
        self.validate_auth()?;
        Ok(())
    }

    fn validate_engine(&self) -> anyhow::Result<()> {
        if self.engine.languages.is_empty() {
            anyhow::bail!("engine.languages must list at least one language");
        }

        if self.engine.engine_type == EngineType::CoquiServer && self.engine.base_url.is_none() {
            anyhow::bail!("engine.base_url is required for the coqui_server engine");
        }

        if self.engine.engine_type == EngineType::CoquiCli && self.engine.command.trim().is_empty() {
            anyhow::bail!("engine.command must not be empty for the coqui_cli engine");
        }

        if self.engine.timeout()?.is_zero() {
            anyhow::bail!("engine.timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_defaults(&self) -> anyhow::Result<()> {
        let language = &self.defaults.language;

        if !self
            .engine
            .languages
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(language))
        {
            anyhow::bail!("defaults.language '{language}' is not in engine.languages");
        }

        if self.defaults.speaker.trim().is_empty() {
            anyhow::bail!("defaults.speaker must not be empty");
        }

        Ok(())
    }

    fn validate_output(&self) -> anyhow::Result<()> {
        if self.output.max_age()?.is_zero() {
            anyhow::bail!("output.max_age must be greater than 0");
        }

        if self.output.sweep_interval()?.is_some_and(|interval| interval.is_zero()) {
            anyhow::bail!("output.sweep_interval must be greater than 0");
        }

        Ok(())
    }

    fn validate_auth(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.auth else {
            return Ok(());
        };

        if auth.api_key.as_ref().is_some_and(|key| key.expose_secret().is_empty()) {
            anyhow::bail!("auth.api_key must not be empty when set");
        }

        Ok(())
    }
}
