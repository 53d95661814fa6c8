//! Repository Monitor
//!
//! Runs one poll cycle for one repository:
//!
//! ```text
//! Idle -> Fetching -> Diffing -> (AutoPulling) -> Reporting -> Idle
//! ```
//!
//! The pre-fetch ref snapshot is the baseline. Every ref reported by the
//! fetch is compared against it: new tags become tag markers, branches are
//! walked with [`CommitWalker`], and all candidates are handed to
//! [`aggregate`] for deduplication and truncation.
//!
//! Errors abort only this repository's cycle; isolating them from other
//! repositories is the run loop's job.

use crate::config::Settings;
use crate::error::Result;
use crate::model::{CommitId, FetchedRef, RefKind, RefState};
use crate::repository::{GitProvider, Repository};
use crate::updates::{aggregate, BranchUpdate, UpdateBatch};
use crate::walker::CommitWalker;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;

/// Checks repositories for upstream changes.
pub struct RepositoryMonitor<'a> {
    provider: &'a dyn GitProvider,
    settings: &'a Settings,
}

impl<'a> RepositoryMonitor<'a> {
    pub fn new(provider: &'a dyn GitProvider, settings: &'a Settings) -> Self {
        Self { provider, settings }
    }

    /// Fetch `repo` and report what changed upstream since the last check.
    ///
    /// Pull failures are logged and never affect the result. When the
    /// provider supports it, one time budget covers the whole check.
    pub fn check(&self, repo: &Repository) -> Result<UpdateBatch> {
        info!("Checking repo: {}", repo.name);
        let cycle = self.provider.for_cycle();
        let provider: &dyn GitProvider = match cycle.as_deref() {
            Some(scoped) => scoped,
            None => self.provider,
        };
        let path = repo.path.as_path();

        let local = provider.local_refs(path)?;
        if local.is_empty() {
            debug!("{}: no known refs, everything fetched is new", repo.name);
        }
        debug!("{}: fetching ({} known refs)", repo.name, local.len());
        let fetched = provider.fetch(path)?;

        debug!("{}: diffing {} refs", repo.name, fetched.len());
        let candidates = collect_candidates(provider, self.settings, path, &local, fetched)?;
        let batch = aggregate(candidates, self.settings.max_new_commits);

        if self.settings.auto_pull {
            debug!("{}: pulling", repo.name);
            if let Err(e) = provider.pull(path) {
                info!("Failed pulling repo: {}, {}", repo.name, e);
            }
        }

        debug!(
            "{}: {} update(s) in {} group(s)",
            repo.name,
            batch.total_updates(),
            batch.groups().len()
        );
        Ok(batch)
    }
}

fn collect_candidates(
    provider: &dyn GitProvider,
    settings: &Settings,
    path: &Path,
    local: &RefState,
    fetched: Vec<FetchedRef>,
) -> Result<Vec<BranchUpdate>> {
    let known: Vec<CommitId> = local.branch_tips().cloned().collect();
    let walker = CommitWalker::new(provider, path, &known);
    let mut claimed: HashSet<CommitId> = HashSet::new();
    let mut candidates = Vec::new();

    for fetched_ref in fetched {
        let kind = match fetched_ref.kind() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let name = kind.name().to_string();
        let tip = fetched_ref.tip;

        match &kind {
            RefKind::Tag(_) => {
                if local.contains(&kind) || !settings.notify_new_tag {
                    continue;
                }
                debug!("new tag {} at {}", name, tip.short());
                let commit = provider.commit(path, &tip)?;
                claimed.insert(tip);
                candidates.push(BranchUpdate::new_tag(name, &commit));
            }
            RefKind::Branch(_) => {
                let local_tip = local.get(&kind);
                let is_new = local_tip.is_none();
                if is_new && !settings.notify_new_branch {
                    continue;
                }

                // Another ref already accounts for this tip, or a known
                // branch already pointed at it.
                let already_claimed = claimed.contains(&tip) || local.is_tip(&tip);

                let commits = if already_claimed {
                    Vec::new()
                } else {
                    let local_commit = local_tip
                        .map(|id| provider.commit(path, id))
                        .transpose()?;
                    walker.walk(
                        &kind.refname(),
                        local_commit.as_ref(),
                        &tip,
                        settings.max_new_commits,
                    )?
                };

                if commits.is_empty() && !is_new {
                    continue;
                }
                if !already_claimed {
                    claimed.insert(tip.clone());
                }

                let update = if is_new {
                    debug!("new branch {} at {}", name, tip.short());
                    let tip_commit = match commits.first() {
                        Some(first) if first.id == tip => first.clone(),
                        _ => provider.commit(path, &tip)?,
                    };
                    BranchUpdate::new_branch(name, &tip_commit, commits)
                } else {
                    BranchUpdate::normal(name, commits)
                };
                candidates.push(update);
            }
        }
    }

    Ok(candidates)
}
