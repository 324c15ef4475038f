//! Binary crate for the `city-prices` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Mapping failures to exit codes

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    logger::init(cmd.verbose);
    cmd.run().await
}
