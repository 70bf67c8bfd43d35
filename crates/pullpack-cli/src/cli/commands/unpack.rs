//! `pullpack unpack <file>` – extract a .gz or .tar.gz archive.

use anyhow::Result;
use pullpack_core::{UnpackOptions, Unpacker};
use std::path::Path;

pub fn run_unpack(unpacker: &Unpacker, file: &Path, options: &UnpackOptions) -> Result<()> {
    let path = unpacker.unpack(file, options)?;
    println!("{}", path.display());
    Ok(())
}
