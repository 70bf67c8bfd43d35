mod cli;

use clap::Parser;

use crate::cli::{exit_code, Cli};

fn main() {
    let cli = Cli::parse();
    // Initialize logging as early as possible.
    cli.init_logging();

    if let Err(err) = cli.run() {
        eprintln!("pullpack error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}
