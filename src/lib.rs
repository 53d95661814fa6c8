//! # GitMon Library
//!
//! This library polls a set of git repositories, works out what changed
//! upstream since the last check and produces a bounded, de-duplicated,
//! human-readable summary of it. It is used by the `gitmon` command-line
//! tool but the engine can be driven by any [`repository::GitProvider`]
//! and [`notifier::Notifier`].
//!
//! ## Quick Example
//!
//! ```
//! use gitmon::config;
//!
//! let config = config::parse(
//!     "max.new.commits = 10\n\
//!      repo.api.path = /srv/api\n",
//! )
//! .unwrap();
//! assert_eq!(config.settings.max_new_commits, 10);
//! assert_eq!(config.repositories[0].name, "api");
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `discovery`)**: A flat `key = value` file
//!   parsed once into typed settings, explicit repositories and scan roots.
//! - **Git access (`git`, `repository`, `model`)**: The `GitProvider` seam and
//!   its implementation on top of the system `git` binary.
//! - **Update detection (`walker`, `updates`, `monitor`)**: Walking new
//!   history per branch, merging branches into one ranked and truncated
//!   batch, and deciding which refs are new.
//! - **Delivery (`render`, `notifier`, `output`)**: Turning a batch into text
//!   and handing it to the configured notifier.
//!
//! ## Execution Flow
//!
//! The entry point is [`runner::Runner`], which for each repository, in
//! parallel:
//!
//! 1.  **Snapshot**: Read the remote-tracking refs and tags before fetching.
//! 2.  **Fetch**: Fetch from `origin` and list the refs afterwards.
//! 3.  **Diff**: Walk each changed branch and note new branches and tags.
//! 4.  **Aggregate**: Deduplicate, rank by recency and cut to the limit.
//! 5.  **Pull**: Optionally fast-forward the working copy.
//! 6.  **Report**: Render the batch and notify.

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod interrupt;
pub mod model;
pub mod monitor;
pub mod notifier;
pub mod output;
pub mod render;
pub mod repository;
pub mod runner;
pub mod updates;
pub mod walker;

#[cfg(test)]
mod testing;
