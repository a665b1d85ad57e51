//! # Reconciliation Engine
//!
//! Decides whether the local copy of a project is stale and, if so, replaces
//! it with a freshly fetched one.
//!
//! ## Comparing Versions
//!
//! A declared version and the version recorded on disk are compared
//! like-for-like, depending on how the project is pinned:
//!
//! 1. **Tag**: only the tags are compared. Branch and revision are ignored.
//! 2. **Revision, on a backend where a revision is enough**: only the
//!    revisions are compared.
//! 3. **Otherwise**: branch and revision are compared. The wanted branch
//!    falls back to the backend's default branch, and the wanted revision to
//!    the latest revision on that branch, which always asks the remote.
//!
//! A project without metadata on disk is always stale.
//!
//! ## Updating
//!
//! [`Reconciler::update_if_needed`] wipes the destination, fetches, applies
//! the project's `src:` and `patch:` (see [`crate::postfetch`]), writes the
//! metadata file and logs a content fingerprint, strictly in that order.
//! Nothing is rolled back: a failed fetch leaves the destination missing or
//! partial and without metadata, so the next run fetches again.
//!
//! The engine holds no per-project state. Every call takes the project entry
//! and the backend to use.

use std::fmt;
use std::fs;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::fingerprint::hash_directory;
use crate::manifest::ProjectEntry;
use crate::metadata::{Metadata, OnDisk, METADATA_FILENAME};
use crate::postfetch::{apply_patch, restrict_to_source};
use crate::version::Version;

/// Result of [`Reconciler::update_if_needed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The local copy already matches; nothing was touched.
    UpToDate(Version),
    /// The destination was replaced.
    Fetched {
        /// Version reported by the backend after fetching.
        version: Version,
        /// SHA-256 of the destination contents, without the metadata file.
        fingerprint: Option<String>,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::UpToDate(version) => write!(f, "up-to-date ({})", version),
            UpdateOutcome::Fetched { version, .. } => write!(f, "Fetched {}", version),
        }
    }
}

/// Result of [`Reconciler::check_for_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckReport {
    /// Never fetched.
    Available { latest: Version },
    /// The local copy is the latest upstream version.
    UpToDate { latest: Version },
    /// The local copy is what the manifest asks for, but upstream moved on.
    WantedIsCurrent { current: Version, latest: Version },
    /// Manifest, local copy and upstream all disagree.
    Outdated {
        wanted: Version,
        current: Version,
        latest: Version,
    },
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckReport::Available { latest } => write!(f, "available ({})", latest),
            CheckReport::UpToDate { latest } => write!(f, "up-to-date ({})", latest),
            CheckReport::WantedIsCurrent { current, latest } => {
                write!(f, "wanted & current ({}), available ({})", current, latest)
            }
            CheckReport::Outdated {
                wanted,
                current,
                latest,
            } => write!(
                f,
                "wanted ({}), current ({}), available ({})",
                wanted, current, latest
            ),
        }
    }
}

/// Compute the wanted and the local version of a project, reduced to the
/// fields that matter for the comparison.
///
/// `on_disk` is `None` when the project was never fetched; the returned local
/// version is then `None` too and the declared version is returned as-is.
pub fn resolve(
    declared: &Version,
    on_disk: Option<&Version>,
    backend: &dyn Backend,
) -> Result<(Version, Option<Version>)> {
    let Some(on_disk) = on_disk else {
        return Ok((declared.clone(), None));
    };

    if let Some(tag) = declared.tag() {
        let have = Version::new(on_disk.tag(), None, None);
        return Ok((Version::from_tag(tag), Some(have)));
    }

    let (wanted_branch, have_branch) =
        if declared.revision().is_some() && backend.revision_is_enough() {
            (None, None)
        } else {
            (
                Some(declared.branch().unwrap_or(backend.default_branch())),
                on_disk.branch(),
            )
        };

    let wanted_revision = match declared.revision() {
        Some(revision) => revision.to_string(),
        None => backend.latest_revision_on_branch(wanted_branch.unwrap_or_default())?,
    };

    Ok((
        Version::from_branch_revision(wanted_branch, Some(&wanted_revision)),
        Some(Version::from_branch_revision(have_branch, on_disk.revision())),
    ))
}

/// The newest version upstream offers for what the project tracks: the tag
/// itself when pinned to a tag, otherwise the head of the declared (or
/// default) branch. Always asks the remote for branch-tracked projects, even
/// when a revision is pinned.
pub fn latest_version(declared: &Version, backend: &dyn Backend) -> Result<Version> {
    if let Some(tag) = declared.tag() {
        return Ok(Version::from_tag(tag));
    }

    let branch = declared.branch().unwrap_or(backend.default_branch());
    let revision = backend.latest_revision_on_branch(branch)?;
    Ok(Version::from_branch_revision(Some(branch), Some(&revision)))
}

/// Reconciles project entries with their local copies.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    tolerate_corrupt_metadata: bool,
    force: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an unreadable metadata file as if the project was never fetched,
    /// instead of failing.
    pub fn tolerate_corrupt_metadata(mut self, tolerate: bool) -> Self {
        self.tolerate_corrupt_metadata = tolerate;
        self
    }

    /// Fetch even when the local copy is up to date.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Version recorded in the project's metadata file, if any.
    pub fn on_disk_version(&self, project: &ProjectEntry) -> Result<Option<Version>> {
        match Metadata::read(project.destination()) {
            OnDisk::Absent => Ok(None),
            OnDisk::Present(metadata) => {
                if metadata.remote_url() != project.remote_url() {
                    log::info!(
                        "{}: remote changed from {} to {}",
                        project.name(),
                        metadata.remote_url(),
                        project.remote_url()
                    );
                }
                Ok(Some(metadata.version().clone()))
            }
            OnDisk::Corrupt(error) if self.tolerate_corrupt_metadata => {
                log::warn!("{}: ignoring unreadable metadata: {}", project.name(), error);
                Ok(None)
            }
            OnDisk::Corrupt(error) => Err(error),
        }
    }

    /// Wanted and local version of `project`, see [`resolve`].
    pub fn wanted_and_local(
        &self,
        project: &ProjectEntry,
        backend: &dyn Backend,
    ) -> Result<(Version, Option<Version>)> {
        let on_disk = self.on_disk_version(project)?;
        resolve(project.version(), on_disk.as_ref(), backend)
    }

    /// Fetch `project` if its local copy is missing or stale.
    pub fn update_if_needed(
        &self,
        project: &ProjectEntry,
        backend: &dyn Backend,
    ) -> Result<UpdateOutcome> {
        let (wanted, have) = self.wanted_and_local(project, backend)?;

        if let Some(current) = have.as_ref().filter(|have| **have == wanted) {
            if !self.force {
                log::info!("{}: up-to-date ({})", project.name(), current);
                return Ok(UpdateOutcome::UpToDate(current.clone()));
            }
            log::debug!("{}: up-to-date, fetching anyway", project.name());
        }

        log::debug!(
            "{}: Current ({}), Available ({})",
            project.name(),
            have.as_ref().map_or_else(|| "none".to_string(), Version::to_string),
            wanted
        );

        let destination = project.destination();
        if let Ok(existing) = fs::symlink_metadata(destination) {
            log::debug!("Clearing destination {}", destination.display());
            if existing.is_dir() {
                fs::remove_dir_all(destination)?;
            } else {
                fs::remove_file(destination)?;
            }
        }

        let fetched = backend.fetch(&wanted, destination)?;
        log::info!("{}: Fetched {}", project.name(), fetched);

        if let Some(source) = project.source() {
            restrict_to_source(destination, source)?;
        }
        if let Some(patch) = project.patch() {
            apply_patch(destination, patch)?;
            log::info!("{}: applied patch {}", project.name(), patch.display());
        }

        let metadata = Metadata::from_project_entry(project).fetched(fetched.clone());
        metadata.dump()?;

        let fingerprint = match hash_directory(destination, &[METADATA_FILENAME]) {
            Ok(hash) => {
                log::debug!("{}: content hash {}", project.name(), hash);
                Some(hash)
            }
            Err(e) => {
                log::warn!("{}: could not hash {}: {}", project.name(), destination.display(), e);
                None
            }
        };

        Ok(UpdateOutcome::Fetched {
            version: fetched,
            fingerprint,
        })
    }

    /// Report whether a newer version is available, without touching the
    /// destination.
    pub fn check_for_update(
        &self,
        project: &ProjectEntry,
        backend: &dyn Backend,
    ) -> Result<CheckReport> {
        let on_disk = self.on_disk_version(project)?;
        let latest = latest_version(project.version(), backend)?;

        let report = match on_disk {
            None => CheckReport::Available { latest },
            Some(current) if current == latest => CheckReport::UpToDate { latest },
            Some(current) if &current == project.version() => {
                CheckReport::WantedIsCurrent { current, latest }
            }
            Some(current) => CheckReport::Outdated {
                wanted: project.version().clone(),
                current,
                latest,
            },
        };
        log::info!("{}: {}", project.name(), report);
        Ok(report)
    }
}
