//! # Version Control Backends
//!
//! A [`Backend`] is the capability set the reconciliation engine needs from
//! a version control system: resolve the latest revision on a branch, fetch
//! a version into a directory, and answer a couple of static questions about
//! how versions are identified.
//!
//! Backends are bound to a single remote URL. [`for_project`] picks the
//! variant for a project by asking each candidate's [`Backend::check`] in
//! turn; the first one that accepts the remote wins.
//!
//! The shipped variants shell out to the system tools, which means any
//! authentication configured for them (SSH keys, credential helpers, svn
//! auth cache) is used as-is.

pub mod git;
pub mod svn;

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::manifest::ProjectEntry;
use crate::version::Version;

/// Every backend kind known to subfetch, in dispatch order.
pub const KINDS: [&str; 2] = [git::NAME, svn::NAME];

/// Trait for version control operations - allows mocking in tests
pub trait Backend: Send + Sync {
    /// Short name of the backend kind (`git`, `svn`).
    fn name(&self) -> &'static str;

    /// Whether this backend can handle its remote URL.
    fn check(&self) -> bool;

    /// Whether a bare revision uniquely determines what to fetch, making the
    /// branch irrelevant.
    fn revision_is_enough(&self) -> bool;

    /// Branch used when a project declares neither branch nor tag.
    fn default_branch(&self) -> &str;

    /// Latest revision on `branch` of the remote.
    ///
    /// Fails with `Error::RemoteLookup`.
    fn latest_revision_on_branch(&self, branch: &str) -> Result<String>;

    /// Materialize `version` into `destination` and return the version that
    /// was actually fetched, with any ambiguous fields resolved.
    ///
    /// Fails with `Error::Fetch`.
    fn fetch(&self, version: &Version, destination: &Path) -> Result<Version>;

    /// Version text of the underlying tool.
    fn list_tool_info(&self) -> Result<String>;
}

/// Create the backend of the given kind for `remote`.
pub fn create(kind: &str, remote: &str) -> Option<Box<dyn Backend>> {
    match kind {
        git::NAME => Some(Box::new(git::GitBackend::new(remote))),
        svn::NAME => Some(Box::new(svn::SvnBackend::new(remote))),
        _ => None,
    }
}

/// Find the backend that handles the project's remote.
///
/// When the project names a `vcs`, only that kind is considered.
pub fn for_project(project: &ProjectEntry) -> Result<Box<dyn Backend>> {
    let candidates = KINDS
        .into_iter()
        .filter(|kind| project.vcs().is_none_or(|vcs| vcs == *kind))
        .filter_map(|kind| create(kind, project.remote_url()))
        .collect();
    select(project, candidates)
}

/// Return the first candidate whose `check()` accepts the project's remote.
pub fn select(
    project: &ProjectEntry,
    candidates: Vec<Box<dyn Backend>>,
) -> Result<Box<dyn Backend>> {
    for backend in candidates {
        if backend.check() {
            log::debug!("{}: using {} for {}", project.name(), backend.name(), project.remote_url());
            return Ok(backend);
        }
        log::debug!("{}: {} rejected {}", project.name(), backend.name(), project.remote_url());
    }

    Err(Error::UnsupportedBackend {
        url: project.remote_url().to_string(),
        vcs: project.vcs().map(str::to_string),
    })
}

/// Run an external tool and return its trimmed stdout.
///
/// Interactive prompts are disabled so an unreachable or private remote
/// fails instead of waiting for input.
pub(crate) fn run_tool(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    log::trace!("Running: {}", command);

    let mut cmd = Command::new(program);
    cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| Error::ToolCommand {
        command: command.clone(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(Error::ToolCommand {
            command,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Message of a failed tool invocation, without the wrapping error prefix.
pub(crate) fn failure_message(error: Error) -> String {
    match error {
        Error::ToolCommand { command, stderr } => format!("{}: {}", command, stderr),
        other => other.to_string(),
    }
}
