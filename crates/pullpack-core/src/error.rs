//! Error types returned by fetch and unpack.
//!
//! Both operations return their own enum so callers can match on the precise
//! failure; `kind()` collapses either one into the shared [`ErrorKind`]
//! taxonomy (used e.g. for CLI exit codes).

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification shared by [`FetchError`] and [`UnpackError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unusable caller input: a malformed URL or a destination path of the wrong type.
    Configuration,
    /// The input archive does not exist.
    NotFound,
    /// The archive suffix is neither `.gz` nor `.tar.gz`.
    UnsupportedFormat,
    /// HTTP status, connection, stream interruption or cancellation during a fetch.
    Transport,
    /// Local filesystem failure.
    Io,
}

/// Failure reported by a [`crate::transport::Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// libcurl reported an error (connect, timeout, truncated body, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// The cancel token was set during the transfer.
    #[error("transfer cancelled")]
    Cancelled,
    /// The body sink failed to store a chunk (disk full, permission denied...).
    #[error("writing response body: {0}")]
    Sink(#[source] std::io::Error),
}

impl TransportError {
    /// HTTP status carried by the error, if it is a status failure.
    pub fn status(&self) -> Option<u32> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("output directory {} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Overwriting would replace a directory with the downloaded file.
    #[error("{} is a directory; refusing to overwrite it with a download", .0.display())]
    OutputIsDirectory(PathBuf),

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            // A malformed locator is a caller configuration problem, not a transport one.
            FetchError::InvalidUrl { .. }
            | FetchError::NotADirectory(_)
            | FetchError::OutputIsDirectory(_) => ErrorKind::Configuration,
            FetchError::Transport {
                source: TransportError::Sink(_),
                ..
            } => ErrorKind::Io,
            FetchError::Transport { .. } => ErrorKind::Transport,
            FetchError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("archive {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("output directory {} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("unsupported archive format: {} (expected .gz or .tar.gz)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("extraction of {} cancelled", .0.display())]
    Cancelled(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UnpackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnpackError::NotFound(_) => ErrorKind::NotFound,
            UnpackError::NotAFile(_) | UnpackError::NotADirectory(_) => ErrorKind::Configuration,
            UnpackError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            UnpackError::Cancelled(_) | UnpackError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UnpackError::Io {
            path: path.into(),
            source,
        }
    }
}
