//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use subfetch::defaults::{default_manifest_path, MANIFEST_ENV};
use subfetch::output::OutputConfig;

/// subfetch - Keep vendored sub-projects in line with a manifest
#[derive(Parser, Debug)]
#[command(name = "subfetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the manifest file
    #[arg(short, long, global = true, value_name = "FILE", env = MANIFEST_ENV)]
    manifest: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every project whose local copy is missing or stale
    Update(commands::update::UpdateArgs),

    /// Report available updates without changing anything
    Check(commands::check::CheckArgs),

    /// Show the version control tools subfetch can use
    Environment,
}

/// Shared settings handed to every command
pub struct Context {
    pub manifest: PathBuf,
    pub output: OutputConfig,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // RUST_LOG takes precedence over --log-level when set
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .parse_default_env()
            .format_timestamp(None)
            .init();

        let context = Context {
            manifest: self.manifest.unwrap_or_else(default_manifest_path),
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Update(args) => commands::update::execute(&context, args),
            Commands::Check(args) => commands::check::execute(&context, args),
            Commands::Environment => commands::environment::execute(&context),
        }
    }
}
