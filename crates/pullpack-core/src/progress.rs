//! Progress reporting for fetch and unpack.
//!
//! Operations talk to a [`Progress`] sink; callers pick [`NoProgress`] to stay
//! silent or [`ConsoleProgress`] for an `indicatif` bar on stdout. Units are
//! bytes: bytes received for a fetch, compressed bytes consumed for an unpack.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Read};

/// Sink for progress updates. Only `advance` is mandatory.
pub trait Progress {
    /// Called once before work starts. `total` is `None` when the size is unknown.
    fn start(&self, _label: &str, _total: Option<u64>) {}

    /// Advance by `n` units.
    fn advance(&self, n: u64);

    /// Called once after work ends (success or failure).
    fn finish(&self) {}
}

/// Discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn advance(&self, _n: u64) {}
}

/// Renders a byte progress bar on stdout (spinner when the total is unknown).
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_draw_target(ProgressDrawTarget::stdout());
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn start(&self, label: &str, total: Option<u64>) {
        match total {
            Some(len) => {
                self.bar.set_length(len);
                self.bar.set_style(bytes_style());
            }
            None => {
                self.bar.unset_length();
                self.bar.set_style(spinner_style());
            }
        }
        self.bar.set_position(0);
        self.bar.set_prefix(label.to_string());
    }

    fn advance(&self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:<24} [{elapsed_precise}] {wide_bar} {bytes}/{total_bytes} ({bytes_per_sec})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━ ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<24} [{elapsed_precise}] {spinner} {bytes} ({bytes_per_sec})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Returns the console sink when `verbose`, otherwise a silent one.
pub fn progress_for(verbose: bool) -> Box<dyn Progress> {
    if verbose {
        Box::new(ConsoleProgress::new())
    } else {
        Box::new(NoProgress)
    }
}

/// Reader adapter that reports every successful read to a [`Progress`] sink.
pub struct ProgressReader<'a, R> {
    inner: R,
    progress: &'a dyn Progress,
}

impl<'a, R: Read> ProgressReader<'a, R> {
    pub fn new(inner: R, progress: &'a dyn Progress) -> Self {
        Self { inner, progress }
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.progress.advance(n as u64);
        }
        Ok(n)
    }
}
