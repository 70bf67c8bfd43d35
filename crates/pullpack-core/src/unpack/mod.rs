//! Unpacker: extract `.gz` and `.tar.gz` archives next to (or into) a directory.
//!
//! `data.gz` decompresses to the file `data`; `archive.tar.gz` extracts to the
//! directory `archive`. Like the fetcher, an existing output is reused unless
//! `overwrite` is set, and work is staged beside the output and moved into
//! place only on success, so a failed extraction leaves nothing at the
//! output path.
//!
//! Archive contents are trusted: there is no cap on decompressed size. Tar
//! entries are unpacked with the `tar` crate's containment rules (entries
//! that would escape the destination are refused).

mod gzip;
mod kind;
mod tarball;

pub use kind::{classify, ArchiveKind, GZ_SUFFIX, TAR_GZ_SUFFIX};

use crate::cancel::{CancelToken, CancellableReader};
use crate::error::UnpackError;
use crate::progress::{progress_for, Progress, ProgressReader};
use crate::storage::{self, DirError};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

const READ_BUFFER: usize = 64 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Destination directory; defaults to the archive's parent directory.
    pub output_dir: Option<PathBuf>,
    /// Delete the archive after a successful extraction.
    pub remove_after: bool,
    /// Extract even if the output already exists.
    pub overwrite: bool,
    /// Render progress on stdout.
    pub verbose: bool,
}

/// Unpacks `file` with default settings. See [`Unpacker::unpack`].
pub fn unpack(file: &Path, options: &UnpackOptions) -> Result<PathBuf, UnpackError> {
    Unpacker::new().unpack(file, options)
}

#[derive(Debug, Clone, Default)]
pub struct Unpacker {
    cancel: CancelToken,
}

impl Unpacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` to abort in-flight extractions.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Extracts `file` and returns the path of the extracted file or directory.
    pub fn unpack(&self, file: &Path, options: &UnpackOptions) -> Result<PathBuf, UnpackError> {
        let progress = progress_for(options.verbose);
        self.unpack_with_progress(file, options, progress.as_ref())
    }

    /// Like [`Unpacker::unpack`] with an explicit progress sink (`verbose` is ignored).
    pub fn unpack_with_progress(
        &self,
        file: &Path,
        options: &UnpackOptions,
        progress: &dyn Progress,
    ) -> Result<PathBuf, UnpackError> {
        let meta = match std::fs::metadata(file) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(UnpackError::NotFound(file.to_path_buf()))
            }
            Err(e) => return Err(UnpackError::io(file, e)),
        };
        if !meta.is_file() {
            return Err(UnpackError::NotAFile(file.to_path_buf()));
        }

        // Classify before touching the filesystem so an unsupported archive creates nothing.
        let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (kind, output_name) = classify(file_name)
            .ok_or_else(|| UnpackError::UnsupportedFormat(file.to_path_buf()))?;

        let output_dir = match &options.output_dir {
            Some(dir) => dir.clone(),
            None => file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        match storage::ensure_dir(&output_dir) {
            Ok(()) => {}
            Err(DirError::NotADirectory) => return Err(UnpackError::NotADirectory(output_dir)),
            Err(DirError::Io(e)) => return Err(UnpackError::io(&output_dir, e)),
        }

        let output_path = output_dir.join(output_name);
        if !options.overwrite && storage::occupied(&output_path) {
            tracing::debug!(path = %output_path.display(), "output exists, skipping unpack");
            return Ok(output_path);
        }

        let job = Extraction {
            archive: file,
            output_dir: &output_dir,
            output_path: &output_path,
            output_name,
            overwrite: options.overwrite,
            progress,
            cancel: &self.cancel,
        };
        progress.start(&format!("Extracting {}", file_name), Some(meta.len()));
        let result = match kind {
            ArchiveKind::Gzip => gzip::extract(&job),
            ArchiveKind::TarGz => tarball::extract(&job),
        };
        progress.finish();
        result?;

        tracing::info!("unpacked {} to {}", file.display(), output_path.display());

        if options.remove_after {
            discard_archive(file);
        }
        Ok(output_path)
    }
}

/// Deletes the archive after a successful extraction. The output is already
/// installed, so a failure here is logged rather than returned.
fn discard_archive(file: &Path) -> bool {
    match std::fs::remove_file(file) {
        Ok(()) => {
            tracing::debug!(path = %file.display(), "removed archive");
            true
        }
        Err(e) => {
            tracing::warn!(path = %file.display(), "could not remove archive: {}", e);
            false
        }
    }
}

/// One in-flight extraction, shared by the format-specific extractors.
pub(crate) struct Extraction<'a> {
    archive: &'a Path,
    output_dir: &'a Path,
    output_path: &'a Path,
    output_name: &'a str,
    overwrite: bool,
    progress: &'a dyn Progress,
    cancel: &'a CancelToken,
}

impl<'a> Extraction<'a> {
    /// Buffered archive reader that reports progress and honours cancellation.
    fn reader(&self) -> Result<impl Read + 'a, UnpackError> {
        let file = File::open(self.archive).map_err(|e| UnpackError::io(self.archive, e))?;
        let buffered = BufReader::with_capacity(READ_BUFFER, file);
        Ok(CancellableReader::new(
            ProgressReader::new(buffered, self.progress),
            self.cancel.clone(),
        ))
    }

    /// Maps a failure while reading/decoding the archive.
    fn read_error(&self, e: io::Error) -> UnpackError {
        if self.cancel.is_cancelled() {
            UnpackError::Cancelled(self.archive.to_path_buf())
        } else {
            UnpackError::io(self.archive, e)
        }
    }

    /// Moves the finished `staged` artifact to the output path, replacing an
    /// existing one when overwriting. A dangling symlink at the output path is
    /// always replaced.
    fn install(&self, staged: &Path) -> Result<(), UnpackError> {
        if self.overwrite || !storage::occupied(self.output_path) {
            storage::remove_path(self.output_path)
                .map_err(|e| UnpackError::io(self.output_path, e))?;
        }
        std::fs::rename(staged, self.output_path)
            .map_err(|e| UnpackError::io(self.output_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::progress::NoProgress;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip_bytes(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    /// Builds a .tar.gz with the given (path, contents) entries.
    fn tar_gz_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let enc = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(enc);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn gzip_decompresses_next_to_archive() {
        let dir = tempfile::tempdir().unwrap();
        let payload: Vec<u8> = (0u8..=255).cycle().take(100_000).collect();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(&payload)).unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert_eq!(out, dir.path().join("data"));
        assert_eq!(std::fs::read(&out).unwrap(), payload);
        assert!(archive.exists(), "archive kept without remove_after");
        assert!(!storage::temp_path(&out).exists());
    }

    #[test]
    fn gzip_multi_member_stream_is_fully_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = gzip_bytes(b"first member, ");
        bytes.extend(gzip_bytes(b"second member"));
        let archive = dir.path().join("joined.txt.gz");
        std::fs::write(&archive, bytes).unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert_eq!(out, dir.path().join("joined.txt"));
        assert_eq!(std::fs::read(out).unwrap(), b"first member, second member");
    }

    #[test]
    fn tar_gz_extracts_into_parent_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("archive.tar.gz");
        std::fs::write(
            &archive,
            tar_gz_bytes(&[("archive/a.txt", "alpha"), ("archive/sub/b.txt", "beta")]),
        )
        .unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert_eq!(out, dir.path().join("archive"));
        assert_eq!(std::fs::read(out.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(std::fs::read(out.join("sub/b.txt")).unwrap(), b"beta");
        // Only the archive and its output remain: no staging directories.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2, "{names:?}");
    }

    #[test]
    fn flat_tar_gz_lands_under_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("flat.tar.gz");
        std::fs::write(&archive, tar_gz_bytes(&[("one", "1"), ("two", "2")])).unwrap();
        let dest = dir.path().join("dest");

        let out = unpack(
            &archive,
            &UnpackOptions {
                output_dir: Some(dest.clone()),
                ..UnpackOptions::default()
            },
        )
        .unwrap();
        assert_eq!(out, dest.join("flat"));
        assert_eq!(std::fs::read(out.join("one")).unwrap(), b"1");
        assert_eq!(std::fs::read(out.join("two")).unwrap(), b"2");
        assert!(!dest.join("one").exists());
    }

    #[test]
    fn unsupported_suffix_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        std::fs::write(&archive, b"PK\x03\x04").unwrap();
        let dest = dir.path().join("dest");

        let err = unpack(
            &archive,
            &UnpackOptions {
                output_dir: Some(dest.clone()),
                ..UnpackOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(!dest.exists());
        assert!(!dir.path().join("data").exists());
    }

    #[test]
    fn missing_archive_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = unpack(&dir.path().join("nope.tar.gz"), &UnpackOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn directory_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("dir.gz");
        std::fs::create_dir(&fake).unwrap();
        let err = unpack(&fake, &UnpackOptions::default()).unwrap_err();
        assert!(matches!(err, UnpackError::NotAFile(_)));
    }

    #[test]
    fn output_dir_occupied_by_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(b"x")).unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let err = unpack(
            &archive,
            &UnpackOptions {
                output_dir: Some(blocker),
                ..UnpackOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn remove_after_deletes_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(b"content")).unwrap();

        let out = unpack(
            &archive,
            &UnpackOptions {
                remove_after: true,
                ..UnpackOptions::default()
            },
        )
        .unwrap();
        assert!(out.exists());
        assert!(!archive.exists());
    }

    #[test]
    fn failed_archive_removal_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.gz");
        assert!(!discard_archive(&gone));

        let archive = dir.path().join("kept.gz");
        std::fs::write(&archive, b"x").unwrap();
        assert!(discard_archive(&archive));
        assert!(!archive.exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_at_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(b"real data")).unwrap();
        let link = dir.path().join("data");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert_eq!(out, link);
        assert!(out.exists());
        assert!(!std::fs::symlink_metadata(&out).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read(&out).unwrap(), b"real data");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_at_tar_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        std::fs::write(&archive, tar_gz_bytes(&[("pkg/a.txt", "alpha")])).unwrap();
        let link = dir.path().join("pkg");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert!(out.is_dir());
        assert_eq!(std::fs::read_to_string(out.join("a.txt")).unwrap(), "alpha");
    }

    #[test]
    fn existing_output_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(b"new")).unwrap();
        let existing = dir.path().join("data");
        std::fs::write(&existing, b"cached").unwrap();

        let out = unpack(&archive, &UnpackOptions::default()).unwrap();
        assert_eq!(out, existing);
        assert_eq!(std::fs::read(&out).unwrap(), b"cached");

        let out = unpack(
            &archive,
            &UnpackOptions {
                overwrite: true,
                ..UnpackOptions::default()
            },
        )
        .unwrap();
        assert_eq!(std::fs::read(out).unwrap(), b"new");
    }

    #[test]
    fn overwrite_replaces_extracted_tree() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        std::fs::write(&archive, tar_gz_bytes(&[("pkg/new.txt", "new")])).unwrap();
        let existing = dir.path().join("pkg");
        std::fs::create_dir(&existing).unwrap();
        std::fs::write(existing.join("old.txt"), b"old").unwrap();

        let out = unpack(
            &archive,
            &UnpackOptions {
                overwrite: true,
                ..UnpackOptions::default()
            },
        )
        .unwrap();
        assert!(out.join("new.txt").exists());
        assert!(!out.join("old.txt").exists());
    }

    #[test]
    fn corrupt_gzip_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.gz");
        let mut bytes = gzip_bytes(&vec![42u8; 50_000]);
        bytes.truncate(bytes.len() / 2);
        std::fs::write(&archive, bytes).unwrap();

        let err = unpack(&archive, &UnpackOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!dir.path().join("broken").exists());
        assert!(!dir.path().join("broken.part").exists());
        assert!(archive.exists(), "archive kept on failure");
    }

    #[test]
    fn corrupt_tar_gz_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.tar.gz");
        std::fs::write(&archive, gzip_bytes(b"definitely not a tar stream")).unwrap();

        let err = unpack(&archive, &UnpackOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "only the archive should remain: {names:?}");
    }

    #[test]
    fn cancelled_unpack_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.gz");
        std::fs::write(&archive, gzip_bytes(b"abc")).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let err = Unpacker::new()
            .with_cancel_token(token)
            .unpack_with_progress(&archive, &UnpackOptions::default(), &NoProgress)
            .unwrap_err();
        assert!(matches!(err, UnpackError::Cancelled(_)));
        assert!(!dir.path().join("data").exists());
        assert!(!dir.path().join("data.part").exists());
    }
}
