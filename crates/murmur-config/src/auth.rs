use secrecy::SecretString;
use serde::Deserialize;

/// API key protection for the HTTP surface
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Shared key clients must present. Auth is disabled when unset
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Paths that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            public_paths: default_public_paths(),
        }
    }
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}
