//! `pullpack get <url>` – fetch an archive, then unpack it.

use anyhow::Result;
use pullpack_core::transport::Transport;
use pullpack_core::{FetchOptions, Fetcher, UnpackOptions, Unpacker};
use std::path::Path;

pub fn run_get<T: Transport>(
    fetcher: &Fetcher<T>,
    unpacker: &Unpacker,
    url: &str,
    output_dir: &Path,
    fetch_options: &FetchOptions,
    unpack_options: &UnpackOptions,
) -> Result<()> {
    let archive = fetcher.fetch(url, output_dir, fetch_options)?;
    tracing::debug!(archive = %archive.display(), "fetched, unpacking");
    let path = unpacker.unpack(&archive, unpack_options)?;
    println!("{}", path.display());
    Ok(())
}
