//! Git backend driving the system `git` command.

use std::fs;
use std::path::Path;

use super::{failure_message, run_tool, Backend};
use crate::error::{Error, Result};
use crate::version::Version;

pub const NAME: &str = "git";

/// Branch fetched when a project declares none.
pub const DEFAULT_BRANCH: &str = "master";

/// A git remote.
///
/// Commit hashes are globally unique, so a pinned revision is enough to
/// fetch without knowing its branch.
pub struct GitBackend {
    remote: String,
}

impl GitBackend {
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
        }
    }

    fn fetch_error(&self, version: &Version, error: Error) -> Error {
        Error::Fetch {
            url: self.remote.clone(),
            version: version.to_string(),
            message: failure_message(error),
        }
    }

    /// Shallow clone of a named ref (tag or branch).
    fn clone_ref(&self, ref_name: &str, destination: &Path) -> Result<()> {
        let dst = destination.to_string_lossy();
        run_tool(
            "git",
            &["clone", "--depth=1", "--branch", ref_name, self.remote.as_str(), &*dst],
            None,
        )
        .map(|_| ())
    }

    /// Fetch a single commit. Works against servers that allow fetching
    /// reachable commits by hash, which covers the common hosts.
    fn checkout_revision(&self, revision: &str, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)?;
        let dst = Some(destination);
        run_tool("git", &["init", "--quiet"], dst)?;
        run_tool("git", &["remote", "add", "origin", self.remote.as_str()], dst)?;
        run_tool("git", &["fetch", "--depth=1", "origin", revision], dst)?;
        run_tool("git", &["checkout", "--quiet", "FETCH_HEAD"], dst).map(|_| ())
    }

    fn head_revision(destination: &Path) -> Result<String> {
        run_tool("git", &["rev-parse", "HEAD"], Some(destination))
    }
}

impl Backend for GitBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self) -> bool {
        run_tool("git", &["ls-remote", "--heads", self.remote.as_str()], None).is_ok()
    }

    fn revision_is_enough(&self) -> bool {
        true
    }

    fn default_branch(&self) -> &str {
        DEFAULT_BRANCH
    }

    fn latest_revision_on_branch(&self, branch: &str) -> Result<String> {
        let lookup_error = |message: String| Error::RemoteLookup {
            url: self.remote.clone(),
            branch: branch.to_string(),
            message,
        };

        let ref_name = format!("refs/heads/{}", branch);
        let stdout = run_tool("git", &["ls-remote", self.remote.as_str(), ref_name.as_str()], None)
            .map_err(|e| lookup_error(failure_message(e)))?;

        // Output format: <hash>\t<ref>
        stdout
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .find(|(_, name)| *name == ref_name)
            .map(|(hash, _)| hash.to_string())
            .ok_or_else(|| lookup_error("branch not found on remote".to_string()))
    }

    fn fetch(&self, version: &Version, destination: &Path) -> Result<Version> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| self.fetch_error(version, e.into()))?;
        }

        let fetched = match (version.tag(), version.revision()) {
            (Some(tag), _) => self.clone_ref(tag, destination),
            (None, Some(revision)) => self.checkout_revision(revision, destination),
            (None, None) => self.clone_ref(
                version.branch().unwrap_or(DEFAULT_BRANCH),
                destination,
            ),
        };
        fetched.map_err(|e| self.fetch_error(version, e))?;

        let revision =
            Self::head_revision(destination).map_err(|e| self.fetch_error(version, e))?;

        let git_dir = destination.join(".git");
        if git_dir.exists() {
            fs::remove_dir_all(&git_dir).map_err(|e| self.fetch_error(version, e.into()))?;
        }

        // Record the branch that was actually followed so the next comparison
        // against the default branch matches. A bare revision keeps no branch.
        Ok(match (version.tag(), version.revision()) {
            (Some(tag), _) => Version::from_tag(tag),
            (None, Some(_)) => Version::from_branch_revision(version.branch(), Some(&revision)),
            (None, None) => Version::from_branch_revision(
                Some(version.branch().unwrap_or(DEFAULT_BRANCH)),
                Some(&revision),
            ),
        })
    }

    fn list_tool_info(&self) -> Result<String> {
        run_tool("git", &["--version"], None)
    }
}
