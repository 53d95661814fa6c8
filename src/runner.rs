//! Monitor Run Loop
//!
//! Checks every repository once, in parallel on a bounded rayon pool of
//! `max.parallel` workers. Repositories share nothing except the read-only
//! settings and the notifier, whose calls are serialized so that output
//! from different repositories never interleaves.
//!
//! A failing repository is logged and skipped. An interrupt stops handing
//! out work, suppresses any pending notification and surfaces as
//! `Error::Interrupted`.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::interrupt::InterruptFlag;
use crate::monitor::RepositoryMonitor;
use crate::notifier::Notifier;
use crate::render;
use crate::repository::{GitProvider, Repository};
use log::{info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Counts collected over one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Repositories that were fetched and diffed.
    pub checked: usize,
    /// Repositories that produced a notification.
    pub updated: usize,
    /// Repositories skipped because of an error.
    pub failed: usize,
}

pub struct Runner<'a> {
    provider: &'a dyn GitProvider,
    notifier: &'a dyn Notifier,
    settings: &'a Settings,
    interrupt: InterruptFlag,
    output_lock: Mutex<()>,
}

impl<'a> Runner<'a> {
    pub fn new(
        provider: &'a dyn GitProvider,
        notifier: &'a dyn Notifier,
        settings: &'a Settings,
        interrupt: InterruptFlag,
    ) -> Self {
        Self {
            provider,
            notifier,
            settings,
            interrupt,
            output_lock: Mutex::new(()),
        }
    }

    /// Run one poll cycle over `repos`.
    pub fn run(&self, repos: &[Repository]) -> Result<RunReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.max_parallel.max(1))
            .thread_name(|i| format!("gitmon-worker-{}", i))
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

        let checked = AtomicUsize::new(0);
        let updated = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        pool.install(|| {
            repos.par_iter().for_each(|repo| {
                if self.interrupt.is_set() {
                    return;
                }
                match self.check_one(repo) {
                    Ok(notified) => {
                        checked.fetch_add(1, Ordering::Relaxed);
                        if notified {
                            updated.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    Err(Error::Interrupted) => {}
                    Err(e) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        if e.is_fetch_failure() {
                            info!("Failed checking for updates: {}: {}", repo.path.display(), e);
                        } else {
                            warn!("Failed checking {}: {}", repo.name, e);
                        }
                    }
                }
            });
        });

        self.interrupt.check()?;

        Ok(RunReport {
            checked: checked.into_inner(),
            updated: updated.into_inner(),
            failed: failed.into_inner(),
        })
    }

    /// Check one repository and notify if anything changed. Returns whether
    /// a notification was sent.
    fn check_one(&self, repo: &Repository) -> Result<bool> {
        let monitor = RepositoryMonitor::new(self.provider, self.settings);
        let batch = monitor.check(repo)?;
        if batch.is_empty() {
            return Ok(false);
        }

        let title = render::title(repo);
        let body = render::body(&batch, self.settings.max_files_info);

        let _guard = self
            .output_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.interrupt.check()?;
        if let Err(e) = self
            .notifier
            .notify(&title, &body, &self.settings.icon_path)
        {
            warn!("Error while notifying about {}: {}", repo.name, e);
            return Ok(false);
        }
        Ok(true)
    }
}
