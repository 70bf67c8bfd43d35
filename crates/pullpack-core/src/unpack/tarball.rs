//! Tar+gzip extraction into a staging directory next to the output.

use super::Extraction;
use crate::error::UnpackError;
use flate2::read::GzDecoder;
use std::path::{Path, PathBuf};

/// Unpacks the whole archive into a temporary directory inside `output_dir`,
/// then installs its root at the output path.
///
/// When the archive holds a single top-level entry named like the output
/// (`pkg.tar.gz` containing `pkg/`), that entry becomes the output. Otherwise
/// the staging directory itself is installed, so the archive's top-level
/// entries end up under the output directory instead of spilling into
/// `output_dir`.
pub(super) fn extract(job: &Extraction<'_>) -> Result<(), UnpackError> {
    let staging = tempfile::Builder::new()
        .prefix(".pullpack-")
        .tempdir_in(fs_dir(job.output_dir))
        .map_err(|e| UnpackError::io(job.output_dir, e))?;

    let mut archive = tar::Archive::new(GzDecoder::new(job.reader()?));
    archive.set_overwrite(true);
    archive
        .unpack(staging.path())
        .map_err(|e| job.read_error(e))?;

    let root = archive_root(staging.path(), job.output_name)
        .map_err(|e| UnpackError::io(staging.path(), e))?;
    if root == staging.path() {
        relax_permissions(&root).map_err(|e| UnpackError::io(&root, e))?;
    }
    tracing::debug!(root = %root.display(), "tar archive staged");
    job.install(&root)?;
    // `staging` is removed on drop; after installing it directly this is a no-op.
    Ok(())
}

/// Picks the path to install: the single top-level entry named `name`, or
/// the staging directory itself.
fn archive_root(staging: &Path, name: &str) -> std::io::Result<PathBuf> {
    let mut entries = std::fs::read_dir(staging)?;
    match entries.next().transpose()? {
        Some(only) if entries.next().is_none() && only.file_name() == name => Ok(only.path()),
        _ => Ok(staging.to_path_buf()),
    }
}

/// Temp dirs are created 0700; give an installed staging dir the usual 0755.
#[cfg(unix)]
fn relax_permissions(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn relax_permissions(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `tempdir_in("")` would resolve against the process cwd anyway; be explicit.
fn fs_dir(dir: &Path) -> &Path {
    if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    }
}
