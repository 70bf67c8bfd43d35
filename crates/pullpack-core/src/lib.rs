//! Fetch remote files over HTTP(S) and unpack `.gz` / `.tar.gz` archives.
//!
//! Both operations are idempotent (an existing output is returned as-is
//! unless overwriting is requested) and never leave a partial artifact at
//! their output path when they fail.

pub mod cancel;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod progress;
pub mod storage;
pub mod transport;
pub mod unpack;
pub mod url_model;

pub use cancel::CancelToken;
pub use error::{ErrorKind, FetchError, TransportError, UnpackError};
pub use fetch::{fetch, FetchOptions, Fetcher};
pub use unpack::{unpack, UnpackOptions, Unpacker};
