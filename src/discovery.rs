//! Resolve the configuration into the list of repositories to check.
//!
//! Explicit `repo.<id>` entries come first, followed by every repository
//! found below the `scan.<id>` roots. A scanned repository is named after
//! its directory and the root it was found in, e.g. `api (work)`.

use crate::config::{Config, ScanRootConfig};
use crate::defaults::expand_home;
use crate::repository::Repository;
use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Every repository named or found through `config`, without duplicates.
pub fn discover(config: &Config) -> Vec<Repository> {
    let mut seen = HashSet::new();
    let mut repos = Vec::new();

    for repo in &config.repositories {
        info!("Tracking repo: \"{}\" at {}", repo.name, repo.path);
        let repo = Repository::new(repo.name.clone(), expand_home(&repo.path));
        if seen.insert(repo.path.clone()) {
            repos.push(repo);
        }
    }

    for root in &config.scan_roots {
        for repo in scan_root(root) {
            if seen.insert(repo.path.clone()) {
                repos.push(repo);
            }
        }
    }

    repos
}

/// Find git repositories up to `root.depth` levels below `root.path`.
///
/// The walk does not descend into a repository once it is found.
pub fn scan_root(root: &ScanRootConfig) -> Vec<Repository> {
    let dir = expand_home(&root.path);
    info!("Scanning for repos in: {}", dir.display());

    let mut repos = Vec::new();
    let mut entries = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(root.depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path while scanning {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() || !is_git_repo(entry.path()) {
            continue;
        }

        info!("Found git repo: {}", entry.path().display());
        let dir_name = entry.file_name().to_string_lossy();
        repos.push(Repository::new(
            format!("{} ({})", dir_name, root.name),
            entry.path(),
        ));
        entries.skip_current_dir();
    }

    repos
}

fn is_git_repo(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}
