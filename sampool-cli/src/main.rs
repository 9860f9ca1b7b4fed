//! ## sampool-cli
//! **Operational tooling for the sample pool**
//!
//! - `sampool stress`: concurrency soak with record-conservation checks
//! - `sampool config`: print the resolved configuration

use clap::Parser;

mod commands;
mod stress;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    commands::run_command(Cli::parse())
}
