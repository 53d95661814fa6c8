//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let Some(fixture) = GitFixture::new() else { return };
//!     fixture.upstream_commit("second", &["a.txt"]);
//!     // ... run gitmon against fixture.clone_dir()
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicI64, Ordering};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::GitFixture;
}

/// Whether a usable `git` binary is installed.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// An upstream repository plus a clone of it, both in a temp directory.
///
/// Every commit gets a timestamp one minute after the previous one so that
/// ordering by commit time is deterministic.
pub struct GitFixture {
    pub temp: assert_fs::TempDir,
    clock: AtomicI64,
}

impl GitFixture {
    /// Create upstream with one commit on `main` and clone it.
    ///
    /// Returns `None` when git is not installed so tests can skip.
    pub fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("git not available, skipping");
            return None;
        }
        let fixture = Self {
            temp: assert_fs::TempDir::new().unwrap(),
            clock: AtomicI64::new(1_700_000_000),
        };
        let upstream = fixture.upstream_dir();
        std::fs::create_dir_all(&upstream).unwrap();
        fixture.git(&upstream, &["init", "-q"]);
        fixture.git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        fixture.upstream_commit("Initial commit", &["README.md"]);

        let clone = fixture.clone_dir();
        fixture.git(
            fixture.temp.path(),
            &["clone", "-q", upstream.to_str().unwrap(), clone.to_str().unwrap()],
        );
        Some(fixture)
    }

    pub fn upstream_dir(&self) -> PathBuf {
        self.temp.path().join("upstream")
    }

    pub fn clone_dir(&self) -> PathBuf {
        self.temp.path().join("clone")
    }

    pub fn home_dir(&self) -> PathBuf {
        self.temp.path().to_path_buf()
    }

    /// Run git with an isolated environment and return stdout.
    pub fn git(&self, dir: &Path, args: &[&str]) -> String {
        let date = format!("@{} +0000", self.clock.load(Ordering::SeqCst));
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("HOME", self.home_dir())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("GIT_AUTHOR_NAME", "Jane Doe")
            .env("GIT_AUTHOR_EMAIL", "jane@example.com")
            .env("GIT_COMMITTER_NAME", "Jane Doe")
            .env("GIT_COMMITTER_EMAIL", "jane@example.com")
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Commit on the current upstream branch, touching `files`.
    pub fn upstream_commit(&self, message: &str, files: &[&str]) {
        self.clock.fetch_add(60, Ordering::SeqCst);
        let upstream = self.upstream_dir();
        for file in files {
            let path = upstream.join(file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            let previous = std::fs::read_to_string(&path).unwrap_or_default();
            std::fs::write(&path, format!("{}{}\n", previous, message)).unwrap();
        }
        self.git(&upstream, &["add", "-A"]);
        self.git(&upstream, &["commit", "-q", "-m", message]);
    }

    /// Run git in the upstream repository.
    pub fn upstream(&self, args: &[&str]) -> String {
        self.git(&self.upstream_dir(), args)
    }

    /// Write a gitmon configuration tracking the clone and return its path.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let path = self.temp.path().join("gitmon.conf");
        let content = format!(
            "repo.project.path = {}\nrepo.project.name = project\n{}",
            self.clone_dir().display(),
            extra
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    /// A `gitmon` command wired to this fixture's config and environment.
    pub fn gitmon(&self, config: &Path) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("gitmon");
        cmd.arg("-c")
            .arg(config)
            .arg("--color")
            .arg("never")
            .env("HOME", self.home_dir())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove("GITMON_CONF")
            .env_remove("RUST_LOG");
        cmd
    }
}
