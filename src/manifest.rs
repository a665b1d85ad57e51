//! # Manifest Schema and Loading
//!
//! This module defines the structures that represent a `subfetch.yaml`
//! manifest and turns it into a list of [`ProjectEntry`] values, one per
//! declared sub-project.
//!
//! ```yaml
//! manifest:
//!   version: "0.0"
//!   remotes:
//!     - name: github
//!       url-base: https://github.com/
//!   projects:
//!     - name: cpputest
//!       repo-path: cpputest/cpputest
//!       dst: ext/cpputest
//!       tag: v3.8
//! ```
//!
//! ## Resolution Rules
//!
//! - A project's remote URL is its `url:` when given. Otherwise it is the
//!   `url-base` of the remote named by `remote:` (or the default remote)
//!   joined with `repo-path:`, falling back to the project name.
//! - The default remote is the one marked `default: true`, else the first one
//!   listed.
//! - `dst:` defaults to the project name and is resolved relative to the
//!   directory holding the manifest. It must stay inside that directory and
//!   may not be the directory itself: destinations are wiped before every
//!   fetch.
//! - `src:` keeps only a sub-folder or a glob of files of the remote.
//! - `patch:` names a patch file, relative to the manifest directory, that is
//!   applied after every fetch.
//! - Project names and destinations must be unique.
//!
//! Entries produced here are never mutated by the reconciliation engine.

use crate::error::{Error, Result};
use crate::version::Version;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Top-level document of a manifest file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub manifest: ManifestSchema,
}

/// The `manifest:` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSchema {
    /// Schema version of the manifest, currently "0.0".
    pub version: String,
    #[serde(default)]
    pub remotes: Vec<RemoteSchema>,
    pub projects: Vec<ProjectSchema>,
}

/// A named location that projects can be fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RemoteSchema {
    pub name: String,
    pub url_base: String,
    #[serde(default)]
    pub default: bool,
}

/// A project as written in the manifest, before remote resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// A single, fully resolved project of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    name: String,
    destination: PathBuf,
    remote_url: String,
    version: Version,
    vcs: Option<String>,
    source: Option<String>,
    patch: Option<PathBuf>,
}

impl ProjectEntry {
    /// Create an entry fetching `remote_url` into a directory named after the
    /// project, tracking the default branch.
    pub fn new(name: &str, remote_url: &str) -> Self {
        Self {
            name: name.to_string(),
            destination: PathBuf::from(name),
            remote_url: remote_url.to_string(),
            version: Version::default(),
            vcs: None,
            source: None,
            patch: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Declare the wanted version. A tag takes priority over branch and
    /// revision, so those are dropped when a tag is present.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = match version.tag() {
            Some(tag) => Version::from_tag(tag),
            None => version,
        };
        self
    }

    pub fn with_vcs(mut self, vcs: &str) -> Self {
        self.vcs = Some(vcs.to_string()).filter(|v| !v.is_empty());
        self
    }

    /// Keep only this sub-folder or glob of the fetched content.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.trim_matches('/').to_string()).filter(|s| !s.is_empty());
        self
    }

    /// Apply this patch file after every fetch.
    pub fn with_patch(mut self, patch: impl Into<PathBuf>) -> Self {
        self.patch = Some(patch.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local directory the project is fetched into.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// The version declared in the manifest, before any defaults are applied.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Explicitly requested version control system, if any.
    pub fn vcs(&self) -> Option<&str> {
        self.vcs.as_deref()
    }

    /// Sub-folder or glob restricting what is kept of the remote.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn patch(&self) -> Option<&Path> {
        self.patch.as_deref()
    }
}

/// A loaded manifest: the resolved projects plus where it was read from.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    projects: Vec<ProjectEntry>,
}

impl Manifest {
    pub fn projects(&self) -> &[ProjectEntry] {
        &self.projects
    }

    /// Select projects by name, keeping manifest order. An empty filter selects
    /// every project; an unknown name is an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ProjectEntry>> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.projects.iter().any(|p| p.name() == name.as_str()))
        {
            return Err(Error::ManifestParse {
                message: format!("No project named '{}' in {}", unknown, self.path.display()),
                hint: Some(format!(
                    "Known projects: {}",
                    self.projects
                        .iter()
                        .map(ProjectEntry::name)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            });
        }

        Ok(self
            .projects
            .iter()
            .filter(|p| names.is_empty() || names.iter().any(|n| n == p.name()))
            .collect())
    }
}

/// Parse manifest YAML. Destinations are resolved relative to `base_dir`.
pub fn parse(yaml_content: &str, base_dir: &Path) -> Result<Vec<ProjectEntry>> {
    let file: ManifestFile = serde_yaml::from_str(yaml_content)?;
    resolve_projects(&file.manifest, base_dir)
}

/// Load and resolve a manifest file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ManifestParse {
        message: format!("Cannot read {}: {}", path.display(), e),
        hint: Some("Pass the manifest location with --manifest".to_string()),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let projects = parse(&content, base_dir)?;
    log::debug!("Loaded {} project(s) from {}", projects.len(), path.display());
    Ok(Manifest {
        path: path.to_path_buf(),
        projects,
    })
}

fn resolve_projects(schema: &ManifestSchema, base_dir: &Path) -> Result<Vec<ProjectEntry>> {
    let default_remote = schema
        .remotes
        .iter()
        .find(|r| r.default)
        .or_else(|| schema.remotes.first());

    let mut names = HashSet::new();
    let mut destinations = HashSet::new();
    let mut entries = Vec::with_capacity(schema.projects.len());

    for project in &schema.projects {
        if project.name.is_empty() {
            return Err(Error::ManifestParse {
                message: "Project without a name".to_string(),
                hint: Some("Every project needs a 'name:'".to_string()),
            });
        }
        if !names.insert(project.name.as_str()) {
            return Err(Error::ManifestParse {
                message: format!("Duplicate project name '{}'", project.name),
                hint: None,
            });
        }

        let remote_url = match &project.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => {
                let remote = match &project.remote {
                    Some(name) => {
                        schema.remotes.iter().find(|r| &r.name == name).ok_or_else(|| {
                            Error::ManifestParse {
                                message: format!(
                                    "Project '{}' refers to unknown remote '{}'",
                                    project.name, name
                                ),
                                hint: Some("Declare it under 'remotes:'".to_string()),
                            }
                        })?
                    }
                    None => default_remote.ok_or_else(|| Error::ManifestParse {
                        message: format!("Project '{}' has no remote", project.name),
                        hint: Some("Add 'url:' to the project or declare a remote".to_string()),
                    })?,
                };
                let repo_path = project.repo_path.as_deref().unwrap_or(&project.name);
                join_url(&remote.url_base, repo_path)
            }
        };

        let dst = project.dst.as_deref().unwrap_or(&project.name);
        check_destination(&project.name, dst)?;
        let destination = base_dir.join(dst);
        if !destinations.insert(destination.clone()) {
            return Err(Error::ManifestParse {
                message: format!(
                    "Destination '{}' of project '{}' is used by another project",
                    dst, project.name
                ),
                hint: Some("Give each project its own 'dst:'".to_string()),
            });
        }

        let version = Version::new(
            project.tag.as_deref(),
            project.branch.as_deref(),
            project.revision.as_deref(),
        );

        let mut entry = ProjectEntry::new(&project.name, &remote_url)
            .with_destination(destination)
            .with_version(version);
        if let Some(vcs) = &project.vcs {
            entry = entry.with_vcs(vcs);
        }
        if let Some(src) = &project.src {
            Pattern::new(src).map_err(|e| Error::ManifestParse {
                message: format!("Invalid src '{}' in project '{}': {}", src, project.name, e),
                hint: Some("Use a folder such as 'src' or a glob such as 'src/*.h'".to_string()),
            })?;
            entry = entry.with_source(src);
        }
        if let Some(patch) = project.patch.as_deref().filter(|p| !p.is_empty()) {
            entry = entry.with_patch(base_dir.join(patch));
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// A destination must be a folder below the manifest directory.
fn check_destination(name: &str, dst: &str) -> Result<()> {
    let path = Path::new(dst);
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    let below = path.components().any(|c| matches!(c, Component::Normal(_)));

    if escapes || !below {
        return Err(Error::ManifestParse {
            message: format!(
                "Destination '{}' of project '{}' is not below the manifest folder",
                dst, name
            ),
            hint: Some("Use a relative 'dst:' without '..', such as 'ext/<name>'".to_string()),
        });
    }
    Ok(())
}

fn join_url(base: &str, repo_path: &str) -> String {
    [base.trim_end_matches('/'), repo_path.trim_matches('/')]
        .join("/")
        .trim_matches('/')
        .to_string()
}
