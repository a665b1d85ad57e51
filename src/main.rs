//! # subfetch CLI
//!
//! This is the binary entry point for the `subfetch` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and colored output.
//! - Executing the appropriate command based on the parsed arguments.
//!
//! The reconciliation logic lives in the `lib.rs` library crate; the binary is
//! a thin wrapper that iterates the manifest and reports per-project results.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
