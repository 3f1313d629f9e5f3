use std::path::PathBuf;

use uuid::Uuid;

use crate::format::AudioFormat;

/// Audio file produced for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisArtifact {
    pub path: PathBuf,
    pub format: AudioFormat,
}

/// `<prefix>_<uuid>.<extension>`, unique across threads and processes
pub(crate) fn unique_file_name(prefix: &str, extension: &str) -> String {
    format!("{prefix}_{}.{extension}", Uuid::new_v4().simple())
}
