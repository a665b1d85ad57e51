//! # Error Handling
//!
//! This module defines the centralized error type for `subfetch`. It uses the
//! `thiserror` library to describe every failure mode of a reconciliation
//! pass with enough context to tell the user which project, remote or file
//! was involved.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Backend failures (`RemoteLookup`, `Fetch`,
//!   `UnsupportedBackend`) abort the reconciliation of a single project;
//!   the caller decides whether to continue with the next one.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! No variant is ever retried by the library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for subfetch operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest could not be read or violates one of its rules.
    #[error("Manifest error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// A backend could not resolve the latest revision on a branch.
    ///
    /// Covers network failures, unknown branches and authentication errors.
    #[error("Could not determine latest revision of '{branch}' on {url}: {message}")]
    RemoteLookup {
        url: String,
        branch: String,
        message: String,
    },

    /// A backend could not materialize the requested version.
    ///
    /// By the time this is returned the destination has already been wiped.
    #[error("Fetch of {url} ({version}) failed: {message}")]
    Fetch {
        url: String,
        version: String,
        message: String,
    },

    /// A metadata file exists but cannot be parsed into a remote and version.
    #[error("Metadata file {} is corrupt: {message}", path.display())]
    MetadataCorrupt { path: PathBuf, message: String },

    /// No backend accepted the declared remote.
    #[error("No supported version control system found for '{url}'{}", vcs.as_ref().map(|v| format!(" (requested vcs: {})", v)).unwrap_or_default())]
    UnsupportedBackend { url: String, vcs: Option<String> },

    /// The declared `src:` matched nothing in the fetched content.
    #[error("Source '{pattern}' not found: {message}")]
    Source { pattern: String, message: String },

    /// The declared patch is missing or does not apply.
    #[error("Patch {} could not be applied: {message}", path.display())]
    Patch { path: PathBuf, message: String },

    /// An external tool (`git`, `svn`) could not be run or reported failure.
    #[error("Command failed: {command} - {stderr}")]
    ToolCommand { command: String, stderr: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// An error while walking a directory tree.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
