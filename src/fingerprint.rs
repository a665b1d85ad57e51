//! Content fingerprint of a fetched directory.
//!
//! The digest covers every file's path (relative to the root, with `/`
//! separators) and content, visited in sorted order so it does not depend on
//! directory listing order. It is reported for auditing only.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::Result;

/// SHA-256 over the files below `root`, skipping any entry whose file name is
/// in `skiplist` (and everything below it).
pub fn hash_directory(root: &Path, skiplist: &[&str]) -> Result<String> {
    let mut hasher = Sha256::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !skiplist
                    .iter()
                    .any(|skip| entry.file_name() == std::ffi::OsStr::new(skip))
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        hasher.update(relative.as_bytes());
        hasher.update([0u8]);
        hasher.update(fs::read(entry.path())?);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
