//! # Update Command Implementation
//!
//! This module implements the `update` subcommand, which brings the local
//! copies of the manifest's projects in line with their declared versions.
//!
//! ## Functionality
//!
//! - For each selected project, the backend handling its remote is chosen and
//!   the reconciliation engine decides whether the local copy is stale.
//! - Stale or missing copies are wiped and fetched again; up-to-date copies
//!   are left alone unless `--force` is given.
//! - A failing project does not stop the others; the command exits with an
//!   error once all projects were processed.

use anyhow::Result;
use clap::Args;

use crate::cli::Context;
use subfetch::backend;
use subfetch::output::{emoji, project_error_line, project_line};
use subfetch::reconcile::{Reconciler, UpdateOutcome};

/// Fetch projects whose local copy is missing or stale
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Only update the named projects
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// Fetch again even when the local copy is up to date
    #[arg(short, long)]
    pub force: bool,

    /// Refetch projects whose metadata file cannot be read instead of failing
    #[arg(long)]
    pub ignore_corrupt_metadata: bool,
}

/// Execute the `update` command.
pub fn execute(context: &Context, args: UpdateArgs) -> Result<()> {
    let manifest = super::load_manifest(context)?;
    let projects = manifest.select(&args.projects)?;

    let reconciler = Reconciler::new()
        .force(args.force)
        .tolerate_corrupt_metadata(args.ignore_corrupt_metadata);

    let mut fetched = 0;
    let mut failed = 0;
    for project in &projects {
        let result = backend::for_project(project)
            .and_then(|backend| reconciler.update_if_needed(project, backend.as_ref()));

        match result {
            Ok(outcome) => {
                if matches!(outcome, UpdateOutcome::Fetched { .. }) {
                    fetched += 1;
                }
                println!(
                    "{}",
                    project_line(&context.output, project.name(), &outcome.to_string())
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}", project_error_line(&context.output, project.name(), &e));
            }
        }
    }

    if fetched > 0 {
        println!(
            "{} {} project(s) fetched",
            emoji(&context.output, "📦", "[FETCH]"),
            fetched
        );
    }

    super::finish(failed, projects.len())
}
