//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `subfetch` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared `Context` and the parsed
//!   `Args` and performs the command's logic.
//!
//! Commands that walk the manifest process one project at a time. A failing
//! project is reported and the next one is processed; the command fails at
//! the end if any project did.

pub mod check;
pub mod environment;
pub mod update;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use subfetch::manifest::{self, Manifest};

/// Load the manifest named by the context.
pub(crate) fn load_manifest(context: &Context) -> Result<Manifest> {
    manifest::from_file(&context.manifest).with_context(|| {
        format!(
            "Failed to load manifest from {}",
            context.manifest.display()
        )
    })
}

/// Turn a failure count into the command result.
pub(crate) fn finish(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("{} of {} project(s) failed", failed, total);
    }
    Ok(())
}
