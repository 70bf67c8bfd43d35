//! HTTP transport seam.
//!
//! The fetcher streams a response body into a [`BodySink`] through a
//! [`Transport`]. Production code uses [`CurlTransport`] (blocking libcurl
//! Easy handle); tests plug in scripted transports.

mod easy;
mod headers;

pub use easy::CurlTransport;
pub use headers::ResponseHead;

use crate::cancel::CancelToken;
use crate::error::TransportError;
use url::Url;

/// Receives a response body. `begin` is called exactly once, before the
/// first chunk and only for a successful (2xx) response.
pub trait BodySink {
    fn begin(&mut self, content_length: Option<u64>) -> Result<(), TransportError>;

    /// Called for every piece of body data, in order. May be empty.
    fn chunk(&mut self, data: &[u8]) -> Result<(), TransportError>;
}

/// Performs a single GET, streaming the body into `sink`. No retries.
///
/// `chunk_size` is a receive-buffer hint. Implementations must also watch
/// `cancel` while connecting or stalled (not only between chunks) and fail
/// with [`TransportError::Cancelled`] once it is set.
pub trait Transport {
    fn get(
        &self,
        url: &Url,
        chunk_size: usize,
        cancel: &CancelToken,
        sink: &mut dyn BodySink,
    ) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(
        &self,
        url: &Url,
        chunk_size: usize,
        cancel: &CancelToken,
        sink: &mut dyn BodySink,
    ) -> Result<(), TransportError> {
        (**self).get(url, chunk_size, cancel, sink)
    }
}

/// Returns true for a 2xx status. Status 0 is what libcurl reports for
/// non-HTTP schemes (e.g. `file://`) and is accepted.
pub fn is_success(status: u32) -> bool {
    status == 0 || (200..300).contains(&status)
}
