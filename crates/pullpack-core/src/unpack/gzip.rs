//! Single-file gzip decompression.

use super::Extraction;
use crate::error::UnpackError;
use crate::storage::{self, PartialArtifact};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Decompresses every gzip member of the archive into `<output>.part`, then
/// installs it at the output path.
pub(super) fn extract(job: &Extraction<'_>) -> Result<(), UnpackError> {
    let staging = storage::temp_path(job.output_path);
    let mut guard = PartialArtifact::new();
    guard.track(&staging);

    let mut decoder = MultiGzDecoder::new(job.reader()?);
    let out = File::create(&staging).map_err(|e| UnpackError::io(&staging, e))?;
    let mut writer = BufWriter::new(out);

    let written = io::copy(&mut decoder, &mut writer).map_err(|e| job.read_error(e))?;
    writer.flush().map_err(|e| UnpackError::io(&staging, e))?;
    let out = writer
        .into_inner()
        .map_err(|e| UnpackError::io(&staging, e.into_error()))?;
    out.sync_all().map_err(|e| UnpackError::io(&staging, e))?;
    drop(out);

    job.install(&staging)?;
    guard.commit();
    tracing::debug!(bytes = written, "decompressed {}", job.archive.display());
    Ok(())
}
