//! In-memory `GitProvider` used by unit tests.

use crate::error::{Error, Result};
use crate::model::{Commit, CommitId, FetchedRef, FileChange, RefKind, RefState};
use crate::repository::GitProvider;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn branch(name: &str) -> String {
    format!("refs/remotes/origin/{}", name)
}

pub fn tag(name: &str) -> String {
    format!("refs/tags/{}", name)
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap()
}

pub fn make_commit(id: &str, seconds: i64, parent: Option<&str>) -> Commit {
    Commit {
        id: CommitId::new(id),
        author: "Dev".to_string(),
        timestamp: at(seconds),
        message: format!("commit {}", id),
        parent: parent.map(CommitId::new),
        files: vec![FileChange {
            path: format!("{}.txt", id),
            insertions: 1,
            deletions: 0,
        }],
    }
}

/// A commit graph plus a "local" and a "remote" ref table. Fetching copies
/// the remote table over the local one, like a real fetch would.
#[derive(Default)]
pub struct FakeGit {
    commits: HashMap<CommitId, Commit>,
    local: Mutex<Vec<(String, CommitId)>>,
    remote: Vec<(String, CommitId)>,
    fetch_error: bool,
    pull_error: bool,
    pub fetches: AtomicUsize,
    pub pulls: AtomicUsize,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain of commits, oldest first, each one second apart starting
    /// at `start`, each the first parent of the next.
    pub fn chain(mut self, parent: Option<&str>, ids: &[&str], start: i64) -> Self {
        let mut parent = parent.map(str::to_string);
        for (offset, id) in ids.iter().enumerate() {
            let commit = make_commit(id, start + offset as i64, parent.as_deref());
            self.commits.insert(commit.id.clone(), commit);
            parent = Some(id.to_string());
        }
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.insert(commit.id.clone(), commit);
        self
    }

    pub fn local(self, refname: &str, id: &str) -> Self {
        self.local
            .lock()
            .unwrap()
            .push((refname.to_string(), CommitId::new(id)));
        self
    }

    pub fn remote(mut self, refname: &str, id: &str) -> Self {
        self.remote.push((refname.to_string(), CommitId::new(id)));
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fetch_error = true;
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.pull_error = true;
        self
    }
}

impl GitProvider for FakeGit {
    fn local_refs(&self, _repo: &Path) -> Result<RefState> {
        let local = self.local.lock().unwrap();
        Ok(local
            .iter()
            .filter_map(|(refname, id)| RefKind::parse(refname).ok().map(|k| (k, id.clone())))
            .collect())
    }

    fn fetch(&self, repo: &Path) -> Result<Vec<FetchedRef>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fetch_error {
            return Err(Error::GitCommand {
                command: "fetch --tags origin".to_string(),
                path: repo.display().to_string(),
                stderr: "Could not resolve host".to_string(),
            });
        }
        *self.local.lock().unwrap() = self.remote.clone();
        Ok(self
            .remote
            .iter()
            .map(|(refname, id)| FetchedRef::new(refname.clone(), id.clone()))
            .collect())
    }

    fn commit(&self, repo: &Path, id: &CommitId) -> Result<Commit> {
        self.commits.get(id).cloned().ok_or_else(|| Error::GitCommand {
            command: format!("show {}", id),
            path: repo.display().to_string(),
            stderr: "unknown revision".to_string(),
        })
    }

    fn is_reachable_from(&self, _repo: &Path, commit: &CommitId, tips: &[CommitId]) -> Result<bool> {
        for tip in tips {
            let mut current = Some(tip.clone());
            while let Some(id) = current {
                if &id == commit {
                    return Ok(true);
                }
                current = self.commits.get(&id).and_then(|c| c.parent.clone());
            }
        }
        Ok(false)
    }

    fn pull(&self, repo: &Path) -> Result<()> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        if self.pull_error {
            return Err(Error::Pull {
                path: repo.display().to_string(),
                message: "Not possible to fast-forward".to_string(),
            });
        }
        Ok(())
    }
}
