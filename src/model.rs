//! Git data as seen by the update-detection engine.
//!
//! These types are produced by a [`GitProvider`](crate::repository::GitProvider)
//! and only live for the duration of one poll cycle.

use crate::defaults::REMOTE;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A commit identifier (the full object hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log output.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line counts for one path touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub insertions: usize,
    pub deletions: usize,
}

/// An immutable commit as read from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// First parent only; merged-in history is never walked.
    pub parent: Option<CommitId>,
    /// Changed files in the order git reports them.
    pub files: Vec<FileChange>,
}

/// A ref reported by a fetch, classified by its full name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefKind {
    /// A remote-tracking branch, by its short name (`main`, `feature/x`).
    Branch(String),
    /// A tag, by its short name.
    Tag(String),
}

impl RefKind {
    /// Classify a full ref name such as `refs/remotes/origin/main` or
    /// `refs/tags/v1.0`.
    pub fn parse(refname: &str) -> Result<Self> {
        let branch_prefix = format!("refs/remotes/{}/", REMOTE);
        if let Some(name) = refname.strip_prefix(&branch_prefix) {
            if !name.is_empty() && name != "HEAD" {
                return Ok(RefKind::Branch(name.to_string()));
            }
        } else if let Some(name) = refname.strip_prefix("refs/tags/") {
            if !name.is_empty() {
                return Ok(RefKind::Tag(name.to_string()));
            }
        }
        Err(Error::MalformedRef {
            refname: refname.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            RefKind::Branch(name) | RefKind::Tag(name) => name,
        }
    }

    /// The full ref name this kind was parsed from.
    pub fn refname(&self) -> String {
        match self {
            RefKind::Branch(name) => format!("refs/remotes/{}/{}", REMOTE, name),
            RefKind::Tag(name) => format!("refs/tags/{}", name),
        }
    }
}

/// The last known tip of every branch and tag, captured before a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefState {
    refs: BTreeMap<RefKind, CommitId>,
}

impl RefState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: RefKind, tip: CommitId) {
        self.refs.insert(kind, tip);
    }

    pub fn get(&self, kind: &RefKind) -> Option<&CommitId> {
        self.refs.get(kind)
    }

    pub fn contains(&self, kind: &RefKind) -> bool {
        self.refs.contains_key(kind)
    }

    /// Whether a known branch points at `id`. Tags do not count.
    pub fn is_tip(&self, id: &CommitId) -> bool {
        self.branch_tips().any(|tip| tip == id)
    }

    /// Tips of the known branches; their history counts as already seen.
    pub fn branch_tips(&self) -> impl Iterator<Item = &CommitId> {
        self.iter()
            .filter(|(kind, _)| matches!(kind, RefKind::Branch(_)))
            .map(|(_, tip)| tip)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RefKind, &CommitId)> {
        self.refs.iter()
    }
}

impl FromIterator<(RefKind, CommitId)> for RefState {
    fn from_iter<I: IntoIterator<Item = (RefKind, CommitId)>>(iter: I) -> Self {
        Self {
            refs: iter.into_iter().collect(),
        }
    }
}

/// One ref as it stands after a fetch.
///
/// Only the raw name and tip are stored. The kind comes from
/// [`FetchedRef::kind`], and whether the ref is new is decided by looking
/// it up in the pre-fetch [`RefState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRef {
    /// Full ref name, e.g. `refs/remotes/origin/main`.
    pub refname: String,
    pub tip: CommitId,
}

impl FetchedRef {
    pub fn new(refname: impl Into<String>, tip: CommitId) -> Self {
        Self {
            refname: refname.into(),
            tip,
        }
    }

    pub fn kind(&self) -> Result<RefKind> {
        RefKind::parse(&self.refname)
    }
}
