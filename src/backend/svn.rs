//! Subversion backend driving the system `svn` command.
//!
//! Repositories are expected to follow the standard layout (`trunk`,
//! `branches/<name>`, `tags/<name>`). A branch consisting of a single space
//! selects the repository root for remotes without that layout.

use std::fs;
use std::path::Path;

use super::{failure_message, run_tool, Backend};
use crate::error::{Error, Result};
use crate::version::Version;

pub const NAME: &str = "svn";

/// Branch fetched when a project declares none.
pub const DEFAULT_BRANCH: &str = "trunk";

/// A subversion remote.
///
/// Revision numbers are repository-wide, so the branch is still needed to
/// know which path to export.
pub struct SvnBackend {
    remote: String,
}

impl SvnBackend {
    pub fn new(remote: &str) -> Self {
        Self {
            remote: remote.to_string(),
        }
    }

    fn base(&self) -> &str {
        self.remote.trim_end_matches('/')
    }

    /// URL of a branch within the standard layout.
    fn branch_url(&self, branch: &str) -> String {
        if branch.trim().is_empty() {
            self.base().to_string()
        } else if branch == DEFAULT_BRANCH {
            format!("{}/{}", self.base(), DEFAULT_BRANCH)
        } else {
            format!("{}/branches/{}", self.base(), branch)
        }
    }

    fn tag_url(&self, tag: &str) -> String {
        format!("{}/tags/{}", self.base(), tag)
    }

    fn last_changed_revision(url: &str) -> Result<String> {
        run_tool(
            "svn",
            &[
                "info",
                "--non-interactive",
                "--show-item",
                "last-changed-revision",
                url,
            ],
            None,
        )
    }

    fn export(url: &str, revision: Option<&str>, destination: &Path) -> Result<()> {
        let dst = destination.to_string_lossy();
        let mut args = vec!["export", "--non-interactive", "--force"];
        if let Some(revision) = revision {
            args.extend(["--revision", revision]);
        }
        args.extend([url, &*dst]);
        run_tool("svn", &args, None).map(|_| ())
    }
}

impl Backend for SvnBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn check(&self) -> bool {
        run_tool("svn", &["info", "--non-interactive", self.remote.as_str()], None).is_ok()
    }

    fn revision_is_enough(&self) -> bool {
        false
    }

    fn default_branch(&self) -> &str {
        DEFAULT_BRANCH
    }

    fn latest_revision_on_branch(&self, branch: &str) -> Result<String> {
        Self::last_changed_revision(&self.branch_url(branch)).map_err(|e| Error::RemoteLookup {
            url: self.remote.clone(),
            branch: branch.to_string(),
            message: failure_message(e),
        })
    }

    fn fetch(&self, version: &Version, destination: &Path) -> Result<Version> {
        let fetch_error = |error: Error| Error::Fetch {
            url: self.remote.clone(),
            version: version.to_string(),
            message: failure_message(error),
        };

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| fetch_error(e.into()))?;
        }

        if let Some(tag) = version.tag() {
            Self::export(&self.tag_url(tag), None, destination).map_err(fetch_error)?;
            return Ok(Version::from_tag(tag));
        }

        let branch = version.branch().unwrap_or(DEFAULT_BRANCH);
        let url = self.branch_url(branch);
        // Pin the revision before exporting so the recorded revision is
        // exactly what was exported.
        let revision = match version.revision() {
            Some(revision) => revision.to_string(),
            None => Self::last_changed_revision(&url).map_err(fetch_error)?,
        };
        Self::export(&url, Some(&revision), destination).map_err(fetch_error)?;

        Ok(Version::from_branch_revision(Some(branch), Some(&revision)))
    }

    fn list_tool_info(&self) -> Result<String> {
        run_tool("svn", &["--version", "--quiet"], None)
    }
}
