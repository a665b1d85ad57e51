//! # Post-Fetch Processing
//!
//! Steps run on a freshly fetched destination before its metadata is
//! written:
//!
//! 1. [`restrict_to_source`] keeps only the project's `src:`, a sub-folder
//!    (`src`) or a glob over files (`src/*.h`). The kept content is
//!    re-rooted so the folder, or the literal folders leading the glob,
//!    becomes the destination root. License files at the root of the
//!    fetched content are always kept.
//! 2. [`apply_patch`] applies the project's `patch:` with the system `patch`
//!    tool.
//!
//! A failing step leaves the destination without metadata, so the next
//! update fetches again.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::backend::{failure_message, run_tool};
use crate::error::{Error, Result};

/// File name prefixes (lowercase) of license files kept by `src:`.
const LICENSE_PREFIXES: [&str; 3] = ["license", "licence", "copying"];

fn has_glob(source: &str) -> bool {
    source.contains(['*', '?', '['])
}

/// Leading folders of `source` that contain no glob characters.
fn literal_prefix(source: &str) -> PathBuf {
    source
        .split('/')
        .take_while(|part| !has_glob(part))
        .collect()
}

fn is_license(name: &str) -> bool {
    let name = name.to_lowercase();
    LICENSE_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Sibling directory holding the full fetch while the selection is copied.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.subfetch-full", name))
}

/// Replace the content of `destination` with the part selected by `source`.
pub fn restrict_to_source(destination: &Path, source: &str) -> Result<()> {
    let staging = staging_path(destination);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::rename(destination, &staging)?;

    let result = copy_selection(&staging, destination, source);
    fs::remove_dir_all(&staging)?;
    result
}

fn copy_selection(full: &Path, destination: &Path, source: &str) -> Result<()> {
    let base = literal_prefix(source);
    let pattern = if has_glob(source) {
        Some(Pattern::new(source)?)
    } else {
        None
    };
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    fs::create_dir_all(destination)?;
    let mut copied = 0;
    for entry in WalkDir::new(full).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(full).unwrap_or(entry.path());
        let selected = match &pattern {
            Some(pattern) => {
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                pattern.matches_with(&relative, options)
            }
            None => relative.starts_with(&base),
        };
        if !selected {
            continue;
        }

        let target = destination.join(relative.strip_prefix(&base).unwrap_or(relative));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    if copied == 0 {
        return Err(Error::Source {
            pattern: source.to_string(),
            message: "nothing in the fetched content matches".to_string(),
        });
    }
    log::debug!("Kept {} file(s) matching '{}'", copied, source);

    for entry in fs::read_dir(full)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let target = destination.join(&name);
        if entry.file_type()?.is_file() && is_license(&name) && !target.exists() {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// Strip level for `patch`: 1 for git-style `a/` and `b/` prefixes, else 0.
fn strip_level(content: &str) -> usize {
    let prefixed = content
        .lines()
        .any(|line| line.starts_with("--- a/") || line.starts_with("+++ b/"));
    usize::from(prefixed)
}

/// Apply the patch file at `patch` to the content of `destination`.
pub fn apply_patch(destination: &Path, patch: &Path) -> Result<()> {
    let patch_error = |message: String| Error::Patch {
        path: patch.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(patch).map_err(|e| patch_error(e.to_string()))?;
    let absolute = fs::canonicalize(patch).map_err(|e| patch_error(e.to_string()))?;
    let input = absolute.to_string_lossy();
    let strip = format!("-p{}", strip_level(&content));

    run_tool(
        "patch",
        &["--batch", "--forward", "--silent", &strip, "--input", &input],
        Some(destination),
    )
    .map_err(|e| patch_error(failure_message(e)))?;
    Ok(())
}
