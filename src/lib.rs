//! # subfetch
//!
//! This library keeps vendored copies of external sub-projects in line with
//! the versions declared in a manifest. It is designed to be used by the
//! `subfetch` command-line tool but the reconciliation engine can be driven
//! directly with any [`backend::Backend`].
//!
//! ## Quick Example
//!
//! ```
//! use subfetch::manifest::ProjectEntry;
//! use subfetch::version::Version;
//!
//! let project = ProjectEntry::new("cpputest", "https://github.com/cpputest/cpputest")
//!     .with_destination("ext/cpputest")
//!     .with_version(Version::from_tag("v3.8"));
//!
//! assert_eq!(project.version().to_string(), "v3.8");
//! assert_eq!(project.destination(), std::path::Path::new("ext/cpputest"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Versions (`version`)**: a tag, branch and revision triple naming a
//!   point in a project's history.
//! - **Metadata (`metadata`)**: the file recording what was last fetched into
//!   a destination.
//! - **Backends (`backend`)**: the version control capabilities the engine
//!   needs, with `git` and `svn` implementations.
//! - **Reconciliation (`reconcile`)**: compares the wanted version with the
//!   one on disk and replaces stale copies.
//! - **Manifest (`manifest`)**: loads `subfetch.yaml` into project entries.
//! - **Post-fetch (`postfetch`)**: keeps only a project's `src:` and applies
//!   its `patch:` after every fetch.
//!
//! ## Execution Flow
//!
//! For every project, one at a time:
//!
//! 1.  **Backend selection**: find the backend whose `check()` accepts the
//!     project's remote.
//! 2.  **Resolution**: read the metadata on disk and derive the wanted and
//!     current versions, asking the remote only when needed.
//! 3.  **Update**: when they differ, wipe the destination, fetch, apply
//!     `src:` and `patch:`, and record the fetched version.

pub mod backend;
pub mod defaults;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod metadata;
pub mod output;
pub mod postfetch;
pub mod reconcile;
pub mod version;
