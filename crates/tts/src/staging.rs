use std::path::{Path, PathBuf};

use crate::artifact::unique_file_name;

/// Reference recording written to disk for the duration of one request
///
/// The file is deleted by [`StagedReference::remove`] once synthesis is over,
/// or on drop if the request bails out early.
#[derive(Debug)]
pub struct StagedReference {
    path: Option<PathBuf>,
}

impl StagedReference {
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the staged file
    pub async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "removed staged reference"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove staged reference"),
            }
        }
    }
}

impl Drop for StagedReference {
    fn drop(&mut self) {
        if let Some(path) = self.path.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove staged reference");
        }
    }
}

/// Write an uploaded reference sample under `temp_dir`
///
/// The caller decides whether an upload was supplied; empty uploads should not
/// reach this point.
pub async fn stage(temp_dir: &Path, audio: &[u8]) -> std::io::Result<StagedReference> {
    tokio::fs::create_dir_all(temp_dir).await?;

    let path = temp_dir.join(unique_file_name("reference", "wav"));
    tokio::fs::write(&path, audio).await?;

    tracing::debug!(path = %path.display(), bytes = audio.len(), "staged reference audio");

    Ok(StagedReference { path: Some(path) })
}
