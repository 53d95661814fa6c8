//! # Repositories and the Git Provider Seam
//!
//! The update-detection engine never talks to git directly. Everything it
//! needs from a repository goes through the [`GitProvider`] trait:
//!
//! - the pre-fetch ref snapshot (`local_refs`),
//! - the fetch itself and the refs it left behind (`fetch`),
//! - commit metadata (`commit`) and reachability from the branch tips
//!   known before the fetch (`is_reachable_from`),
//! - the optional best-effort `pull`.
//!
//! In the application [`SystemGitProvider`] implements it on top of the
//! `git` binary (see [`crate::git`]). Tests substitute an in-memory commit
//! graph so that walking, aggregation and monitoring can be exercised
//! without a network or a repository on disk.

use crate::error::{Error, Result};
use crate::git::{self, GitOptions};
use crate::model::{Commit, CommitId, FetchedRef, RefKind, RefState};
use log::warn;
use std::path::{Path, PathBuf};

/// A repository to monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Display name used in notifications.
    pub name: String,
    pub path: PathBuf,
}

impl Repository {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Trait for git operations - allows mocking in tests
pub trait GitProvider: Send + Sync {
    /// Snapshot the remote-tracking branches and tags as they are before
    /// fetching.
    fn local_refs(&self, repo: &Path) -> Result<RefState>;

    /// Fetch from the remote and report every branch and tag ref afterwards.
    fn fetch(&self, repo: &Path) -> Result<Vec<FetchedRef>>;

    /// Look up a single commit.
    fn commit(&self, repo: &Path, id: &CommitId) -> Result<Commit>;

    /// Whether `commit` is one of `tips` or an ancestor of one of them.
    /// An empty `tips` reaches nothing.
    fn is_reachable_from(&self, repo: &Path, commit: &CommitId, tips: &[CommitId]) -> Result<bool>;

    /// Bring the checked-out branch up to date with its upstream.
    fn pull(&self, repo: &Path) -> Result<()>;

    /// A provider whose time limit covers one whole repository check.
    ///
    /// `None` means the provider has no such limit and is used as is.
    fn for_cycle(&self) -> Option<Box<dyn GitProvider>> {
        None
    }
}

/// The default implementation of `GitProvider`, which uses the system's
/// `git` command.
#[derive(Debug, Clone, Default)]
pub struct SystemGitProvider {
    options: GitOptions,
}

impl SystemGitProvider {
    pub fn new(options: GitOptions) -> Self {
        Self { options }
    }

    fn ensure_exists(repo: &Path) -> Result<()> {
        if repo.join(".git").exists() {
            Ok(())
        } else {
            Err(Error::RepositoryNotFound {
                path: repo.display().to_string(),
            })
        }
    }
}

impl GitProvider for SystemGitProvider {
    fn local_refs(&self, repo: &Path) -> Result<RefState> {
        Self::ensure_exists(repo)?;
        let mut state = RefState::new();
        for (refname, tip) in git::list_refs(repo, &self.options)? {
            match RefKind::parse(&refname) {
                Ok(kind) => state.insert(kind, tip),
                // origin/HEAD is a symbolic ref, not a branch
                Err(_) if refname.ends_with("/HEAD") => {}
                Err(e) => warn!("{}", e),
            }
        }
        Ok(state)
    }

    fn fetch(&self, repo: &Path) -> Result<Vec<FetchedRef>> {
        Self::ensure_exists(repo)?;
        git::fetch(repo, &self.options)?;
        let refs = git::list_refs(repo, &self.options)?
            .into_iter()
            .filter(|(refname, _)| !refname.ends_with("/HEAD"))
            .map(|(refname, tip)| FetchedRef::new(refname, tip))
            .collect();
        Ok(refs)
    }

    fn commit(&self, repo: &Path, id: &CommitId) -> Result<Commit> {
        git::show_commit(repo, id, &self.options)
    }

    fn is_reachable_from(&self, repo: &Path, commit: &CommitId, tips: &[CommitId]) -> Result<bool> {
        git::is_reachable_from(repo, commit, tips, &self.options)
    }

    fn pull(&self, repo: &Path) -> Result<()> {
        git::pull(repo, &self.options).map_err(|e| match e {
            Error::Interrupted => Error::Interrupted,
            other => Error::Pull {
                path: repo.display().to_string(),
                message: other.to_string(),
            },
        })
    }

    fn for_cycle(&self) -> Option<Box<dyn GitProvider>> {
        Some(Box::new(Self::new(self.options.for_cycle())))
    }
}
