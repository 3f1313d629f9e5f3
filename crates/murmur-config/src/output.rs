use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Where artifacts are written and how long they are kept
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory holding generated audio. Staged uploads go to `<directory>/temp`
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Files older than this are removed by the retention sweep
    #[serde(default = "default_max_age")]
    pub max_age: String,
    /// Also sweep on a timer, independent of traffic
    #[serde(default)]
    pub sweep_interval: Option<String>,
    /// `ffmpeg` executable used for transcoding
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            max_age: default_max_age(),
            sweep_interval: None,
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

impl OutputConfig {
    /// Parsed retention threshold
    ///
    /// # Errors
    ///
    /// Returns an error if `max_age` is not a valid duration string
    pub fn max_age(&self) -> anyhow::Result<Duration> {
        parse_duration("output.max_age", &self.max_age)
    }

    /// Parsed periodic sweep interval, if any
    ///
    /// # Errors
    ///
    /// Returns an error if `sweep_interval` is set but not a valid duration string
    pub fn sweep_interval(&self) -> anyhow::Result<Option<Duration>> {
        self.sweep_interval
            .as_deref()
            .map(|s| parse_duration("output.sweep_interval", s))
            .transpose()
    }

    /// Directory for staged reference uploads
    pub fn temp_directory(&self) -> PathBuf {
        self.directory.join("temp")
    }
}

pub(crate) fn parse_duration(field: &str, s: &str) -> anyhow::Result<Duration> {
    duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{s}': {e}"))
}

fn default_directory() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_max_age() -> String {
    "24h".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_age_defaults_to_a_day() {
        let config = OutputConfig::default();
        assert_eq!(config.max_age().unwrap(), Duration::from_secs(24 * 3600));
        assert_eq!(config.sweep_interval().unwrap(), None);
    }

    #[test]
    fn temp_directory_nests_under_output() {
        let config = OutputConfig {
            directory: PathBuf::from("/srv/murmur"),
            ..OutputConfig::default()
        };
        assert_eq!(config.temp_directory(), PathBuf::from("/srv/murmur/temp"));
    }

    #[test]
    fn invalid_duration_names_the_field() {
        let config = OutputConfig {
            max_age: "forever".to_string(),
            ..OutputConfig::default()
        };
        let err = config.max_age().unwrap_err().to_string();
        assert!(err.contains("output.max_age"), "{err}");
    }
}
