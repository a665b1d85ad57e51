//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which reports for every
//! selected project whether a newer upstream version exists.
//!
//! This command is a safe, read-only operation: it never deletes, fetches or
//! writes anything in the project destinations. It does contact every
//! remote tracking a branch, even when a revision is pinned.

use anyhow::Result;
use clap::Args;

use crate::cli::Context;
use subfetch::backend;
use subfetch::output::{project_error_line, project_line};
use subfetch::reconcile::Reconciler;

/// Report available updates without changing anything
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Only check the named projects
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,
}

/// Execute the `check` command.
pub fn execute(context: &Context, args: CheckArgs) -> Result<()> {
    let manifest = super::load_manifest(context)?;
    let projects = manifest.select(&args.projects)?;
    let reconciler = Reconciler::new();

    let mut failed = 0;
    for project in &projects {
        let result = backend::for_project(project)
            .and_then(|backend| reconciler.check_for_update(project, backend.as_ref()));

        match result {
            Ok(report) => println!(
                "{}",
                project_line(&context.output, project.name(), &report.to_string())
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}", project_error_line(&context.output, project.name(), &e));
            }
        }
    }

    super::finish(failed, projects.len())
}
