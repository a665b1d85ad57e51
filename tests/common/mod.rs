//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture holding a temporary workspace with a
//! manifest, plus helpers that build local git and subversion repositories
//! to fetch from, so no network access is needed.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new();
//! let upstream = GitRepo::init(&fixture.child("upstream"));
//! fixture.with_manifest(&manifests::single_git("lib", &upstream.url(), "branch: main"));
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::GitRepo;
    #[allow(unused_imports)]
    pub use super::SvnRepo;
    pub use super::TestFixture;
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// Manifest with a single project fetched from `url`. `version` holds
    /// extra project keys such as `tag: v1.0`.
    pub fn single_git(name: &str, url: &str, version: &str) -> String {
        format!(
            r#"
manifest:
  version: "0.0"
  projects:
    - name: {name}
      url: {url}
      dst: ext/{name}
      vcs: git
      {version}
"#
        )
    }

    /// Manifest whose only project points at a remote no backend accepts.
    pub const UNREACHABLE: &str = r#"
manifest:
  version: "0.0"
  projects:
    - name: ghost
      url: /nonexistent/ghost-repo
      vcs: git
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "manifest: [unclosed";
}

/// A local git repository used as an upstream remote.
#[allow(dead_code)]
pub struct GitRepo {
    path: PathBuf,
}

#[allow(dead_code)]
impl GitRepo {
    /// Create a repository with one commit on `main`.
    pub fn init(path: &Path) -> Self {
        std::fs::create_dir_all(path).expect("Failed to create repo directory");
        let repo = Self {
            path: path.to_path_buf(),
        };
        repo.git(&["init", "--quiet"]);
        repo.git(&["checkout", "--quiet", "-b", "main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "uploadpack.allowAnySHA1InWant", "true"]);
        repo.commit("README.md", "initial\n");
        repo
    }

    /// Run git inside the repository and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file, commit it and return the new commit hash.
    pub fn commit(&self, file: &str, content: &str) -> String {
        std::fs::write(self.path.join(file), content).expect("Failed to write file");
        self.git(&["add", file]);
        self.git(&["commit", "--quiet", "-m", &format!("update {}", file)]);
        self.head()
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// URL usable as a remote by the git backend.
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// A local subversion repository with the standard layout, used as a remote.
#[allow(dead_code)]
pub struct SvnRepo {
    url: String,
    working_copy: PathBuf,
}

#[allow(dead_code)]
impl SvnRepo {
    /// Whether the subversion tools are installed.
    pub fn available() -> bool {
        Command::new("svnadmin")
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    /// Create a repository with `trunk`, `branches` and `tags` and a
    /// checkout of `trunk` next to it.
    pub fn create(path: &Path) -> Self {
        std::fs::create_dir_all(path).expect("Failed to create repo directory");
        run("svnadmin", &["create", &path.to_string_lossy()], None);

        let url = format!("file://{}", path.display());
        let repo = Self {
            working_copy: path.with_extension("wc"),
            url,
        };
        run(
            "svn",
            &[
                "mkdir",
                "--non-interactive",
                "--parents",
                "-m",
                "layout",
                &repo.url_of("trunk"),
                &repo.url_of("branches"),
                &repo.url_of("tags"),
            ],
            None,
        );
        run(
            "svn",
            &[
                "checkout",
                "--non-interactive",
                &repo.url_of("trunk"),
                &repo.working_copy.to_string_lossy(),
            ],
            None,
        );
        repo
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL of a path inside the repository, such as `tags/v1.0`.
    pub fn url_of(&self, path: &str) -> String {
        format!("{}/{}", self.url, path)
    }

    /// Write a file on trunk, commit it and return the new revision.
    pub fn commit(&self, file: &str, content: &str) -> String {
        std::fs::write(self.working_copy.join(file), content).expect("Failed to write file");
        let wc = Some(self.working_copy.as_path());
        run("svn", &["add", "--force", "--non-interactive", "."], wc);
        run("svn", &["commit", "--non-interactive", "-m", &format!("update {}", file)], wc);
        self.revision("trunk")
    }

    /// Last changed revision of a path inside the repository.
    pub fn revision(&self, path: &str) -> String {
        run(
            "svn",
            &[
                "info",
                "--non-interactive",
                "--show-item",
                "last-changed-revision",
                &self.url_of(path),
            ],
            None,
        )
    }

    /// Server-side copy, used to create tags and branches.
    pub fn copy(&self, from: &str, to: &str) {
        run(
            "svn",
            &[
                "copy",
                "--non-interactive",
                "-m",
                &format!("copy {} to {}", from, to),
                &self.url_of(from),
                &self.url_of(to),
            ],
            None,
        );
    }
}

#[allow(dead_code)]
fn run(program: &str, args: &[&str], cwd: Option<&Path>) -> String {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("Failed to run {}: {}", program, e));
    assert!(
        output.status.success(),
        "{} {:?} failed: {}",
        program,
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A test fixture that provides a temporary workspace.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `subfetch.yaml` with the given content.
    pub fn with_manifest(&self, content: &str) -> &Self {
        self.temp_dir
            .child("subfetch.yaml")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create a command configured to run in this fixture's directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("subfetch");
        cmd.current_dir(self.path())
            .env_remove("SUBFETCH_MANIFEST")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_manifests_are_valid_yaml() {
        let manifests = [
            manifests::single_git("lib", "file:///tmp/lib", "tag: v1.0"),
            manifests::UNREACHABLE.to_string(),
        ];

        for manifest in manifests {
            serde_yaml::from_str::<serde_yaml::Value>(&manifest)
                .expect("Manifest should be valid YAML");
        }
    }

    #[test]
    fn test_invalid_yaml_is_actually_invalid() {
        let result = serde_yaml::from_str::<serde_yaml::Value>(manifests::INVALID_YAML);
        assert!(result.is_err(), "INVALID_YAML should not parse");
    }
}
