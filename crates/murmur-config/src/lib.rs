#![allow(clippy::must_use_candidate)]

pub mod auth;
pub mod defaults;
pub mod engine;
mod env;
pub mod health;
mod loader;
pub mod output;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use auth::*;
pub use defaults::*;
pub use engine::*;
pub use env::ExpandError;
pub use health::*;
pub use output::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level murmur configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Optional API key protection
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Synthesis engine selection and capabilities
    #[serde(default)]
    pub engine: EngineConfig,
    /// Output directory and retention
    #[serde(default)]
    pub output: OutputConfig,
    /// Request defaults for omitted form fields
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
