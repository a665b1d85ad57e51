//! # Fetch Metadata
//!
//! Every fetched project carries a small YAML file, [`METADATA_FILENAME`],
//! at the root of its destination. It records the remote and the version
//! that was actually fetched. Its presence is the only signal separating
//! "fetched before" from "never fetched".
//!
//! Reading is done through [`Metadata::read`], which returns an explicit
//! [`OnDisk`] result instead of folding "missing" and "unparsable" into a
//! single error.

use crate::error::{Error, Result};
use crate::manifest::ProjectEntry;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata file inside each project destination.
pub const METADATA_FILENAME: &str = ".subfetch_data.yaml";

/// Serialized layout of the metadata file
#[derive(Debug, Serialize, Deserialize)]
struct MetadataFile {
    subfetch: MetadataFields,
}

#[derive(Debug, Serialize, Deserialize)]
struct MetadataFields {
    remote_url: String,
    #[serde(default)]
    branch: String,
    #[serde(default)]
    revision: String,
    #[serde(default)]
    tag: String,
}

/// The remote and version last fetched into a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    remote_url: String,
    version: Version,
    path: PathBuf,
}

/// Outcome of looking for a metadata file on disk.
#[derive(Debug)]
pub enum OnDisk {
    /// No metadata file: the project was never fetched.
    Absent,
    /// A readable metadata file.
    Present(Metadata),
    /// A metadata file exists but could not be parsed.
    Corrupt(Error),
}

impl Metadata {
    /// Metadata describing what the project entry asks for, located in the
    /// entry's destination. Nothing is read or written.
    pub fn from_project_entry(project: &ProjectEntry) -> Self {
        Self {
            remote_url: project.remote_url().to_string(),
            version: project.version().clone(),
            path: Self::path_for(project.destination()),
        }
    }

    /// Location of the metadata file for a destination directory.
    pub fn path_for(destination: &Path) -> PathBuf {
        destination.join(METADATA_FILENAME)
    }

    /// Parse a metadata file.
    ///
    /// A missing file is reported as `Error::Io`; any content that does not
    /// describe a remote and version is `Error::MetadataCorrupt`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: MetadataFile =
            serde_yaml::from_str(&content).map_err(|e| Error::MetadataCorrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let fields = file.subfetch;
        if fields.remote_url.is_empty() {
            return Err(Error::MetadataCorrupt {
                path: path.to_path_buf(),
                message: "empty remote_url".to_string(),
            });
        }

        Ok(Self {
            remote_url: fields.remote_url,
            version: Version::new(
                Some(fields.tag.as_str()),
                Some(fields.branch.as_str()),
                Some(fields.revision.as_str()),
            ),
            path: path.to_path_buf(),
        })
    }

    /// Look up the metadata of a destination directory.
    pub fn read(destination: &Path) -> OnDisk {
        let path = Self::path_for(destination);
        if !path.exists() {
            return OnDisk::Absent;
        }
        match Self::from_file(&path) {
            Ok(metadata) => OnDisk::Present(metadata),
            Err(Error::Io(e)) => OnDisk::Corrupt(Error::MetadataCorrupt {
                path,
                message: e.to_string(),
            }),
            Err(e) => OnDisk::Corrupt(e),
        }
    }

    /// Record that `version` was fetched. Returns the updated record.
    pub fn fetched(self, version: Version) -> Self {
        Self { version, ..self }
    }

    /// Write the record to its path, replacing any previous content.
    pub fn dump(&self) -> Result<()> {
        let file = MetadataFile {
            subfetch: MetadataFields {
                remote_url: self.remote_url.clone(),
                branch: self.version.branch().unwrap_or_default().to_string(),
                revision: self.version.revision().unwrap_or_default().to_string(),
                tag: self.version.tag().unwrap_or_default().to_string(),
            },
        };
        let content = serde_yaml::to_string(&file)?;
        log::debug!("Writing repo metadata to: {}", self.path.display());
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}
