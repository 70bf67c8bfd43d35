//! CLI parse tests.

use super::{exit_code, Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}


#[test]
fn cli_parse_global_options() {
    let cli = Cli::try_parse_from([
        "pullpack",
        "unpack",
        "a.gz",
        "--config",
        "/tmp/pullpack.toml",
        "--log-file",
        "/tmp/pullpack.log",
    ])
    .unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/pullpack.toml")));
    assert_eq!(cli.log_file.as_deref(), Some(std::path::Path::new("/tmp/pullpack.log")));
}

#[test]
fn cli_rejects_missing_subcommand() {
    assert!(Cli::try_parse_from(["pullpack"]).is_err());
}

#[test]
fn exit_code_follows_error_kind() {
    use pullpack_core::UnpackError;
    use std::path::PathBuf;

    let err = anyhow::Error::new(UnpackError::NotFound(PathBuf::from("x.gz")));
    assert_eq!(exit_code(&err), 3);
    let err = anyhow::Error::new(UnpackError::UnsupportedFormat(PathBuf::from("x.zip")))
        .context("while unpacking");
    assert_eq!(exit_code(&err), 4);
    assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
}
