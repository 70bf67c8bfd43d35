//! Blocking single-stream GET over a libcurl Easy handle.

use super::{is_success, BodySink, ResponseHead, Transport};
use crate::cancel::CancelToken;
use crate::config::HttpConfig;
use crate::error::TransportError;
use std::cell::Cell;
use std::str;
use url::Url;

/// libcurl clamps its receive buffer to this range.
const MIN_BUFFER: usize = 1024;
const MAX_BUFFER: usize = 512 * 1024;

/// [`Transport`] backed by libcurl. Each `get` uses a fresh Easy handle.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    http: HttpConfig,
}

impl CurlTransport {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }

    pub fn http_config(&self) -> &HttpConfig {
        &self.http
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &Url, chunk_size: usize) -> Result<(), curl::Error> {
        easy.url(url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.http.max_redirections)?;
        easy.connect_timeout(self.http.connect_timeout())?;
        // Abort stalled transfers instead of imposing a wall-clock limit on large bodies.
        easy.low_speed_limit(self.http.low_speed_limit_bytes)?;
        easy.low_speed_time(self.http.low_speed_time())?;
        easy.buffer_size(chunk_size.clamp(MIN_BUFFER, MAX_BUFFER))?;
        // Enables the progress callback, which is how a cancel reaches a stalled transfer.
        easy.progress(true)?;
        if let Some(ua) = &self.http.user_agent {
            easy.useragent(ua)?;
        }
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn get(
        &self,
        url: &Url,
        chunk_size: usize,
        cancel: &CancelToken,
        sink: &mut dyn BodySink,
    ) -> Result<(), TransportError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url, chunk_size)?;

        let head = Cell::new(ResponseHead::default());
        let sink_error: Cell<Option<TransportError>> = Cell::new(None);
        let mut begun = false;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let mut h = head.get();
                    h.feed(line);
                    head.set(h);
                }
                true
            })?;
            // libcurl calls this at least once a second, even while connecting or stalled.
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.write_function(|data| {
                let h = head.get();
                if !begun {
                    // Never hand an error page to the sink; aborting here surfaces as a
                    // write error and is reported as the HTTP status below.
                    if h.status.is_some_and(|s| !is_success(s)) {
                        return Ok(0);
                    }
                    if let Err(e) = sink.begin(h.content_length) {
                        sink_error.set(Some(e));
                        return Ok(0);
                    }
                    begun = true;
                }
                match sink.chunk(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error.set(Some(e));
                        Ok(0) // abort transfer
                    }
                }
            })?;
            let result = transfer.perform();
            result
        };

        if let Some(e) = sink_error.take() {
            return Err(e);
        }
        if performed.is_err() && cancel.is_cancelled() {
            tracing::debug!(url = %url, "transfer aborted by cancel token");
            return Err(TransportError::Cancelled);
        }

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(TransportError::Http {
                url: url.to_string(),
                status: code,
            });
        }
        performed?;

        if !begun {
            // Empty body: the write callback never ran.
            sink.begin(head.get().content_length)?;
        }
        tracing::debug!(url = %url, status = code, "GET completed");
        Ok(())
    }
}
