//! Default values for subfetch configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File name of the manifest looked up when `--manifest` is not given.
pub const MANIFEST_FILENAME: &str = "subfetch.yaml";

/// Environment variable that can point at the manifest.
pub const MANIFEST_ENV: &str = "SUBFETCH_MANIFEST";

/// Returns the default manifest path, relative to the working directory.
///
/// This can be overridden by the `--manifest` CLI flag or the
/// `SUBFETCH_MANIFEST` environment variable.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from(MANIFEST_FILENAME)
}
