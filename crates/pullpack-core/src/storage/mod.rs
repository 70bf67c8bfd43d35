//! Output file lifecycle: directory preparation, `.part` staging paths and
//! cleanup of partial artifacts.

mod guard;

pub use guard::PartialArtifact;

use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Outcome of [`ensure_dir`].
#[derive(Debug)]
pub enum DirError {
    /// Something other than a directory already occupies the path.
    NotADirectory,
    Io(io::Error),
}

/// Creates `dir` and its parents if missing. Fails with `NotADirectory` when a
/// file (or anything non-directory) is already at that path.
pub fn ensure_dir(dir: &Path) -> Result<(), DirError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DirError::NotADirectory),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            std::fs::create_dir_all(dir).map_err(DirError::Io)
        }
        Err(e) => Err(DirError::Io(e)),
    }
}

/// Removes a file or a whole directory tree. Missing paths are not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// True if `path` resolves to an existing file or directory. Symlinks are
/// followed, so a dangling link does not count as a cached output.
pub fn occupied(path: &Path) -> bool {
    path.exists()
}

/// True if `path` itself is a directory (a symlink to one is not).
pub fn is_real_dir(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
}
