//! # Versions of a Sub-Project
//!
//! A [`Version`] names a point in a project's history through up to three
//! fields: a tag, a branch and a revision. All three may be filled in at the
//! same time, for example once a "latest on branch" request has been
//! resolved to a concrete revision.
//!
//! Equality is plain structural equality over the triple. The rules for
//! *which* fields take part in a staleness comparison live in
//! [`crate::reconcile`], not here.

use std::fmt;

/// An immutable identifier of a point in a project's history.
///
/// Empty strings are normalised to `None` on construction, so a field that
/// was "not given" has exactly one representation and compares equal
/// regardless of where it came from (manifest, metadata file, backend).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
    tag: Option<String>,
    branch: Option<String>,
    revision: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl Version {
    /// Build a version from all three fields at once.
    pub fn new(tag: Option<&str>, branch: Option<&str>, revision: Option<&str>) -> Self {
        Self {
            tag: non_empty(tag),
            branch: non_empty(branch),
            revision: non_empty(revision),
        }
    }

    /// A version identified by tag only.
    pub fn from_tag(tag: &str) -> Self {
        Self::new(Some(tag), None, None)
    }

    /// A version identified by branch and/or revision.
    pub fn from_branch_revision(branch: Option<&str>, revision: Option<&str>) -> Self {
        Self::new(None, branch, revision)
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            return write!(f, "{}", tag);
        }
        match (&self.branch, &self.revision) {
            (Some(branch), Some(revision)) => write!(f, "{} - {}", branch, revision),
            (Some(branch), None) => write!(f, "{}", branch),
            (None, Some(revision)) => write!(f, "{}", revision),
            (None, None) => write!(f, "latest"),
        }
    }
}
