//! RAII guard that removes partial outputs unless the operation committed.

use std::path::{Path, PathBuf};

/// Paths owned by an in-flight operation. Dropping the guard without calling
/// [`PartialArtifact::commit`] removes every tracked path (file or tree).
/// Removal is best-effort: failures are logged, never returned.
#[derive(Debug, Default)]
pub struct PartialArtifact {
    paths: Vec<PathBuf>,
    committed: bool,
}

impl PartialArtifact {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path` for removal on failure.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Mark the operation successful; nothing is removed on drop.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialArtifact {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.paths {
            match super::remove_path(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
                Err(e) => {
                    tracing::warn!(path = %path.display(), "could not remove partial output: {}", e)
                }
            }
        }
    }
}
