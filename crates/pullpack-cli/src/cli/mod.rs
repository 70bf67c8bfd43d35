//! CLI for pullpack.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pullpack_core::config::{self, PullpackConfig};
use pullpack_core::transport::CurlTransport;
use pullpack_core::{
    logging, CancelToken, ErrorKind, FetchError, FetchOptions, Fetcher, UnpackError,
    UnpackOptions, Unpacker,
};
use std::path::PathBuf;

use commands::{run_fetch, run_get, run_unpack};

/// Top-level CLI for pullpack.
#[derive(Debug, Parser)]
#[command(name = "pullpack")]
#[command(about = "Fetch remote files and unpack .gz / .tar.gz archives", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/pullpack/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL into a directory, named after the URL's last path segment.
    Fetch {
        /// HTTP/HTTPS URL to download.
        url: String,

        /// Directory to write into (created if missing).
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,

        /// Read/write chunk size in bytes (default from config, 8192).
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,

        /// Download again even if the file already exists.
        #[arg(long = "override")]
        overwrite: bool,

        /// Show progress.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract a .gz or .tar.gz archive.
    Unpack {
        /// Archive to extract.
        file: PathBuf,

        /// Destination directory (default: the archive's directory).
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Delete the archive after a successful extraction.
        #[arg(long)]
        remove_after: bool,

        /// Extract again even if the output already exists.
        #[arg(long = "override")]
        overwrite: bool,

        /// Show progress.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Fetch an archive, then unpack it next to the download.
    Get {
        /// HTTP/HTTPS URL of a .gz or .tar.gz archive.
        url: String,

        /// Directory for the download and the extracted output.
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,

        /// Read/write chunk size in bytes (default from config, 8192).
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,

        /// Delete the archive after a successful extraction.
        #[arg(long)]
        remove_after: bool,

        /// Redo both steps even if their outputs already exist.
        #[arg(long = "override")]
        overwrite: bool,

        /// Show progress.
        #[arg(short, long)]
        verbose: bool,
    },
}

impl CliCommand {
    pub fn verbose(&self) -> bool {
        match self {
            CliCommand::Fetch { verbose, .. }
            | CliCommand::Unpack { verbose, .. }
            | CliCommand::Get { verbose, .. } => *verbose,
        }
    }
}

impl Cli {
    /// Set up logging: the log file when given (falling back to stderr), else stderr.
    pub fn init_logging(&self) {
        let verbose = self.command.verbose();
        match &self.log_file {
            Some(path) => {
                if let Err(e) = logging::init_logging_to_file(path, verbose) {
                    eprintln!("pullpack: logging to {} failed ({:#}), using stderr", path.display(), e);
                    logging::init_logging(verbose);
                }
            }
            None => logging::init_logging(verbose),
        }
    }

    fn load_config(&self) -> Result<PullpackConfig> {
        match &self.config {
            Some(path) => config::load_from(path),
            None => config::load(),
        }
    }

    pub fn run(self) -> Result<()> {
        let cfg = self.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let cancel = install_ctrlc_handler()?;
        let fetcher = Fetcher::with_transport(CurlTransport::new(cfg.http.clone()))
            .with_cancel_token(cancel.clone());
        let unpacker = Unpacker::new().with_cancel_token(cancel);

        match self.command {
            CliCommand::Fetch {
                url,
                output_dir,
                chunk_size,
                overwrite,
                verbose,
            } => {
                let options = FetchOptions {
                    chunk_size: chunk_size.unwrap_or(cfg.chunk_size),
                    overwrite,
                    verbose: verbose || cfg.verbose,
                };
                run_fetch(&fetcher, &url, &output_dir, &options)?;
            }
            CliCommand::Unpack {
                file,
                output_dir,
                remove_after,
                overwrite,
                verbose,
            } => {
                let options = UnpackOptions {
                    output_dir,
                    remove_after,
                    overwrite,
                    verbose: verbose || cfg.verbose,
                };
                run_unpack(&unpacker, &file, &options)?;
            }
            CliCommand::Get {
                url,
                output_dir,
                chunk_size,
                remove_after,
                overwrite,
                verbose,
            } => {
                let verbose = verbose || cfg.verbose;
                let fetch_options = FetchOptions {
                    chunk_size: chunk_size.unwrap_or(cfg.chunk_size),
                    overwrite,
                    verbose,
                };
                let unpack_options = UnpackOptions {
                    output_dir: Some(output_dir.clone()),
                    remove_after,
                    overwrite,
                    verbose,
                };
                run_get(&fetcher, &unpacker, &url, &output_dir, &fetch_options, &unpack_options)?;
            }
        }

        Ok(())
    }
}

/// First Ctrl-C cancels the running operation so it can clean up; a second
/// one exits immediately.
fn install_ctrlc_handler() -> Result<CancelToken> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(130);
        }
        eprintln!("pullpack: interrupted, cleaning up (press Ctrl-C again to exit now)");
        handler_token.cancel();
    })
    .context("could not set the ctrl-c handler")?;
    Ok(token)
}

/// Process exit code for a failed run, by error kind.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let kind = err
        .chain()
        .find_map(|e| {
            e.downcast_ref::<FetchError>()
                .map(FetchError::kind)
                .or_else(|| e.downcast_ref::<UnpackError>().map(UnpackError::kind))
        });
    match kind {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::UnsupportedFormat) => 4,
        Some(ErrorKind::Transport) => 5,
        Some(ErrorKind::Io) => 6,
        None => 1,
    }
}

#[cfg(test)]
mod tests;
