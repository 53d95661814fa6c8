//! Default values for gitmon configuration.
//!
//! This module provides centralized default values used across the crate,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "GITMON_CONF";

/// Name of the configuration file looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".gitmon.conf";

/// Remote that is fetched and compared against.
pub const REMOTE: &str = "origin";

pub const NOTIFY_NEW_BRANCH: bool = true;
pub const NOTIFY_NEW_TAG: bool = true;
pub const AUTO_PULL: bool = false;
pub const MAX_NEW_COMMITS: usize = 5;
/// Number of changed files listed per commit. 0 means unlimited.
pub const MAX_FILES_INFO: usize = 3;
pub const SCAN_DEPTH: usize = 3;
pub const MAX_PARALLEL: usize = 4;
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Returns the default configuration file location, `~/.gitmon.conf`.
///
/// Falls back to `.gitmon.conf` in the current directory if the home
/// directory cannot be determined.
///
/// This can be overridden by the `-c` CLI flag or the `GITMON_CONF`
/// environment variable.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Returns the default notification icon, `git.png` next to the executable.
pub fn default_icon_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("git.png")
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
