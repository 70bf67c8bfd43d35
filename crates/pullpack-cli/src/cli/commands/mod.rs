//! CLI command handlers. Each command prints the path it produced on stdout.

mod fetch;
mod get;
mod unpack;

pub use fetch::run_fetch;
pub use get::run_get;
pub use unpack::run_unpack;
