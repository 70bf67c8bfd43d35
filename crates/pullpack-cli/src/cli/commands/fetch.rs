//! `pullpack fetch <url>` – download a file into a directory.

use anyhow::Result;
use pullpack_core::transport::Transport;
use pullpack_core::{FetchOptions, Fetcher};
use std::path::Path;

pub fn run_fetch<T: Transport>(
    fetcher: &Fetcher<T>,
    url: &str,
    output_dir: &Path,
    options: &FetchOptions,
) -> Result<()> {
    let path = fetcher.fetch(url, output_dir, options)?;
    println!("{}", path.display());
    Ok(())
}
