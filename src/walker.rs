//! Commit Walker
//!
//! Walks a freshly fetched branch tip back along first parents and collects
//! the commits that are new compared to what was known before the fetch.
//!
//! The walk stops at the first commit that:
//! - is not newer than the local tip (same id, or not strictly later),
//! - is already reachable from a branch tip known before the fetch, or
//! - has no parent,
//!
//! and never yields more than `max_depth` commits. The bound is per branch;
//! the global bound across branches is applied by [`crate::updates::aggregate`].
//!
//! The known-history check is what keeps a new branch from reporting the
//! shared history it forked from, and a rewritten branch from reporting
//! commits that were already on it.

use crate::error::Result;
use crate::model::{Commit, CommitId};
use crate::repository::GitProvider;
use log::debug;
use std::path::Path;

/// Walks history of one repository through a [`GitProvider`].
pub struct CommitWalker<'a> {
    provider: &'a dyn GitProvider,
    repo: &'a Path,
    /// Branch tips as they were before the fetch.
    known: &'a [CommitId],
}

impl<'a> CommitWalker<'a> {
    pub fn new(provider: &'a dyn GitProvider, repo: &'a Path, known: &'a [CommitId]) -> Self {
        Self {
            provider,
            repo,
            known,
        }
    }

    /// Collect new commits on `refname`, newest first.
    ///
    /// `local` is the branch tip before the fetch, or `None` for a branch
    /// that has never been seen.
    pub fn walk(
        &self,
        refname: &str,
        local: Option<&Commit>,
        remote_tip: &CommitId,
        max_depth: usize,
    ) -> Result<Vec<Commit>> {
        let mut commits = Vec::new();
        if local.is_some_and(|l| &l.id == remote_tip) {
            return Ok(commits);
        }

        let mut next = Some(remote_tip.clone());
        while let Some(id) = next {
            if commits.len() >= max_depth {
                break;
            }
            let commit = self.provider.commit(self.repo, &id)?;
            if !is_newer(local, &commit) {
                break;
            }
            if self.provider.is_reachable_from(self.repo, &commit.id, self.known)? {
                debug!("{}: {} is already known", refname, commit.id.short());
                break;
            }
            next = commit.parent.clone();
            commits.push(commit);
        }

        debug!("{}: {} new commit(s)", refname, commits.len());
        Ok(commits)
    }
}

/// A remote commit is newer when there is no local tip, or when it is a
/// different commit with a strictly later timestamp.
pub fn is_newer(local: Option<&Commit>, remote: &Commit) -> bool {
    match local {
        None => true,
        Some(local) => local.id != remote.id && remote.timestamp > local.timestamp,
    }
}
