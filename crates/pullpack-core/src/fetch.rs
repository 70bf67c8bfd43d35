//! Fetcher: download a URL into `output_dir/<last path segment>`.
//!
//! An existing output is reused unless `overwrite` is set. The body is staged
//! in `<output>.part` and renamed into place only after the transfer and the
//! final flush succeed; on any failure the staging file is removed, so the
//! output path never holds a truncated download.

use crate::cancel::CancelToken;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::{FetchError, TransportError};
use crate::progress::{progress_for, Progress};
use crate::storage::{self, DirError, PartialArtifact};
use crate::transport::{BodySink, CurlTransport, Transport};
use crate::url_model::derive_filename;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Size of the pieces the body is written and reported in. Also passed to
    /// libcurl as its receive-buffer size (which libcurl clamps to 1 KiB..512 KiB).
    pub chunk_size: usize,
    /// Re-download even if the output already exists.
    pub overwrite: bool,
    /// Render progress on stdout.
    pub verbose: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overwrite: false,
            verbose: false,
        }
    }
}

/// Downloads with the default libcurl transport. See [`Fetcher::fetch`].
pub fn fetch(url: &str, output_dir: &Path, options: &FetchOptions) -> Result<PathBuf, FetchError> {
    Fetcher::new().fetch(url, output_dir, options)
}

pub struct Fetcher<T = CurlTransport> {
    transport: T,
    cancel: CancelToken,
}

impl Fetcher<CurlTransport> {
    pub fn new() -> Self {
        Self::with_transport(CurlTransport::default())
    }
}

impl Default for Fetcher<CurlTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` to abort in-flight transfers.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `url` into `output_dir`, returning the output path.
    /// Progress goes to stdout when `options.verbose` is set.
    pub fn fetch(
        &self,
        url: &str,
        output_dir: &Path,
        options: &FetchOptions,
    ) -> Result<PathBuf, FetchError> {
        let progress = progress_for(options.verbose);
        self.fetch_with_progress(url, output_dir, options, progress.as_ref())
    }

    /// Like [`Fetcher::fetch`] with an explicit progress sink (`verbose` is ignored).
    pub fn fetch_with_progress(
        &self,
        url: &str,
        output_dir: &Path,
        options: &FetchOptions,
        progress: &dyn Progress,
    ) -> Result<PathBuf, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        match storage::ensure_dir(output_dir) {
            Ok(()) => {}
            Err(DirError::NotADirectory) => {
                return Err(FetchError::NotADirectory(output_dir.to_path_buf()))
            }
            Err(DirError::Io(e)) => return Err(FetchError::io(output_dir, e)),
        }

        let file_name = derive_filename(&parsed);
        let output = output_dir.join(&file_name);

        if !options.overwrite && storage::occupied(&output) {
            tracing::debug!(path = %output.display(), "output exists, skipping fetch");
            return Ok(output);
        }
        if options.overwrite && storage::is_real_dir(&output) {
            return Err(FetchError::OutputIsDirectory(output));
        }

        let staging = storage::temp_path(&output);
        let mut guard = PartialArtifact::new();
        guard.track(&staging);

        let chunk_size = options.chunk_size.max(1);
        let file = File::create(&staging).map_err(|e| FetchError::io(&staging, e))?;
        let mut sink = FileSink {
            writer: BufWriter::with_capacity(chunk_size, file),
            label: format!("Downloading {}", file_name),
            chunk_size,
            progress,
            cancel: &self.cancel,
            bytes: 0,
        };

        let result = self
            .transport
            .get(&parsed, chunk_size, &self.cancel, &mut sink);
        progress.finish();
        result.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let bytes = sink.bytes;
        let file = sink
            .writer
            .into_inner()
            .map_err(|e| FetchError::io(&staging, e.into_error()))?;
        file.sync_all().map_err(|e| FetchError::io(&staging, e))?;
        drop(file);

        if options.overwrite {
            storage::remove_path(&output).map_err(|e| FetchError::io(&output, e))?;
        }
        std::fs::rename(&staging, &output).map_err(|e| FetchError::io(&output, e))?;
        guard.commit();

        tracing::info!(url = %parsed, bytes, "fetched {}", output.display());
        Ok(output)
    }
}

/// Writes body data to the staging file in `chunk_size` pieces and reports progress.
struct FileSink<'a> {
    writer: BufWriter<File>,
    label: String,
    chunk_size: usize,
    progress: &'a dyn Progress,
    cancel: &'a CancelToken,
    bytes: u64,
}

impl BodySink for FileSink<'_> {
    fn begin(&mut self, content_length: Option<u64>) -> Result<(), TransportError> {
        self.progress.start(&self.label, content_length);
        Ok(())
    }

    fn chunk(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        // Empty reads yield no pieces.
        for piece in data.chunks(self.chunk_size) {
            self.writer.write_all(piece).map_err(TransportError::Sink)?;
            self.bytes += piece.len() as u64;
            self.progress.advance(piece.len() as u64);
        }
        Ok(())
    }
}
