//! # xwalk-sync CLI
//!
//! Binary entry point for the `xwalk-sync` command-line tool. It parses
//! arguments with `clap` and dispatches to a command; errors propagate out
//! of `main` as `anyhow` errors and exit with status 1.
//!
//! The generator itself lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
