//! # Updates and the Update Aggregator
//!
//! An [`Update`] is one reportable entry: either a real commit or a marker
//! announcing a new branch or tag. Updates are grouped per branch or tag in
//! a [`BranchUpdate`], and the groups of one repository form an
//! [`UpdateBatch`].
//!
//! [`aggregate`] turns the raw per-ref candidates into the final batch:
//!
//! 1. **Flatten** – every commit id is attributed to the first group that
//!    mentions it, so a commit reachable from two branches is reported once.
//! 2. **Rank** – all surviving updates are stable-sorted by timestamp,
//!    newest first, and cut down to `max_total`.
//! 3. **Regroup** – survivors go back to their owning group, in ranked
//!    order. Groups left empty disappear, markers included: a marker ranks
//!    by the timestamp of the commit it points at, exactly like a commit.
//!
//! Afterwards the batch holds at most `max_total` updates and no commit id
//! appears in two different groups.

use crate::model::{Commit, CommitId, FileChange};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A "branch created" / "tag created" notice bound to the ref's tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub id: CommitId,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Commit> for Marker {
    fn from(commit: &Commit) -> Self {
        Self {
            id: commit.id.clone(),
            author: commit.author.clone(),
            timestamp: commit.timestamp,
        }
    }
}

/// One reportable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Commit(Commit),
    NewBranch(Marker),
    NewTag(Marker),
}

impl Update {
    pub fn id(&self) -> &CommitId {
        match self {
            Update::Commit(commit) => &commit.id,
            Update::NewBranch(marker) | Update::NewTag(marker) => &marker.id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Update::Commit(commit) => commit.timestamp,
            Update::NewBranch(marker) | Update::NewTag(marker) => marker.timestamp,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Update::Commit(commit) => &commit.author,
            Update::NewBranch(marker) | Update::NewTag(marker) => &marker.author,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Update::Commit(commit) => commit.message.trim(),
            Update::NewBranch(_) => "New branch created",
            Update::NewTag(_) => "New tag created",
        }
    }

    /// Changed files; always empty for markers.
    pub fn files(&self) -> &[FileChange] {
        match self {
            Update::Commit(commit) => &commit.files,
            Update::NewBranch(_) | Update::NewTag(_) => &[],
        }
    }

    pub fn is_marker(&self) -> bool {
        !matches!(self, Update::Commit(_))
    }
}

/// What kind of change a group reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Normal,
    NewBranch,
    NewTag,
}

impl Category {
    /// Text appended to the group header.
    pub fn suffix(&self) -> &'static str {
        match self {
            Category::Normal => "",
            Category::NewBranch => " (New branch)",
            Category::NewTag => " (New tag)",
        }
    }
}

/// Updates of a single branch or tag, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchUpdate {
    pub name: String,
    pub category: Category,
    pub updates: Vec<Update>,
}

impl BranchUpdate {
    /// New commits on a known branch.
    pub fn normal(name: impl Into<String>, commits: Vec<Commit>) -> Self {
        Self {
            name: name.into(),
            category: Category::Normal,
            updates: commits.into_iter().map(Update::Commit).collect(),
        }
    }

    /// A branch seen for the first time: a marker for `tip`, then `commits`.
    pub fn new_branch(name: impl Into<String>, tip: &Commit, commits: Vec<Commit>) -> Self {
        let mut updates = Vec::with_capacity(commits.len() + 1);
        updates.push(Update::NewBranch(Marker::from(tip)));
        updates.extend(commits.into_iter().map(Update::Commit));
        Self {
            name: name.into(),
            category: Category::NewBranch,
            updates,
        }
    }

    /// A tag seen for the first time. Tags never carry history.
    pub fn new_tag(name: impl Into<String>, tip: &Commit) -> Self {
        Self {
            name: name.into(),
            category: Category::NewTag,
            updates: vec![Update::NewTag(Marker::from(tip))],
        }
    }

    fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            category: self.category,
            updates: Vec::new(),
        }
    }
}

/// Final, ranked updates of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    groups: Vec<BranchUpdate>,
}

impl UpdateBatch {
    pub fn groups(&self) -> &[BranchUpdate] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of updates across all groups.
    pub fn total_updates(&self) -> usize {
        self.groups.iter().map(|g| g.updates.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BranchUpdate> {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for &'a UpdateBatch {
    type Item = &'a BranchUpdate;
    type IntoIter = std::slice::Iter<'a, BranchUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Deduplicate, rank and truncate candidate groups into an [`UpdateBatch`].
pub fn aggregate(candidates: Vec<BranchUpdate>, max_total: usize) -> UpdateBatch {
    // Flatten: commit id -> index of the group that claimed it first.
    let mut owners: HashMap<CommitId, usize> = HashMap::new();
    let mut pool: Vec<(usize, Update)> = Vec::new();
    let mut shells = Vec::with_capacity(candidates.len());

    for (index, group) in candidates.into_iter().enumerate() {
        shells.push(group.empty_like());
        for update in group.updates {
            match owners.entry(update.id().clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(index);
                    pool.push((index, update));
                }
                // a new-branch marker and the tip commit share an id
                Entry::Occupied(entry) if *entry.get() == index => pool.push((index, update)),
                Entry::Occupied(entry) => {
                    debug!(
                        "{} already reported under {}",
                        update.id().short(),
                        shells[*entry.get()].name
                    );
                }
            }
        }
    }

    // Rank: stable, so equal timestamps keep their input order.
    pool.sort_by(|(_, a), (_, b)| b.timestamp().cmp(&a.timestamp()));
    pool.truncate(max_total);

    // Regroup in ranked order.
    let mut positions: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<BranchUpdate> = Vec::new();
    for (index, update) in pool {
        let position = *positions.entry(index).or_insert_with(|| {
            groups.push(shells[index].empty_like());
            groups.len() - 1
        });
        groups[position].updates.push(update);
    }

    UpdateBatch { groups }
}
