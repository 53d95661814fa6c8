//! # Error Handling
//!
//! This module defines the centralized error type for `gitmon`. It uses the
//! `thiserror` library to create a single `Error` enum that covers every
//! anticipated failure mode, each variant carrying enough context to produce
//! a useful message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors. The
//!   variants fall into a few groups:
//!     - configuration problems (`ConfigParse`, `ConfigNotFound`,
//!       `NoRepositories`), which are fatal for the whole run;
//!     - git failures (`GitCommand`, `Timeout`, `RepositoryNotFound`), which
//!       only abort the cycle of the repository they happened in;
//!     - recoverable per-item problems (`MalformedRef`, `Pull`, `Notify`),
//!       which are logged and skipped;
//!     - `Interrupted`, raised when the user aborts the run.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use thiserror::Error;

/// Main error type for gitmon operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be parsed or holds invalid values.
    ///
    /// Includes an optional hint about how to fix the problem.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The configuration file does not exist.
    #[error("Configuration not found at {path}. Create ~/.gitmon.conf, set $GITMON_CONF, or pass a file with '-c'")]
    ConfigNotFound { path: String },

    /// Neither explicit repositories nor scan roots produced anything to check.
    #[error("Your configuration has no repositories. Define repo.<id>.path or scan.<id>.path entries")]
    NoRepositories,

    /// A configured repository path does not exist or is not a git work tree.
    #[error("Could not load repository at path: {path}")]
    RepositoryNotFound { path: String },

    /// A git command exited unsuccessfully.
    #[error("Git command failed in {path}: {command} - {stderr}")]
    GitCommand {
        command: String,
        path: String,
        stderr: String,
    },

    /// A git command did not finish within the configured timeout.
    #[error("Git command timed out after {seconds}s in {path}: {command}")]
    Timeout {
        command: String,
        path: String,
        seconds: u64,
    },

    /// A fetched ref is neither a remote-tracking branch nor a tag.
    #[error("Unknown ref type: {refname}")]
    MalformedRef { refname: String },

    /// `git pull` failed after a successful check.
    #[error("Failed pulling repo {path}: {message}")]
    Pull { path: String, message: String },

    /// A notifier could not deliver its message.
    #[error("Notifier '{notifier}' failed: {message}")]
    Notify { notifier: String, message: String },

    /// The run was aborted by the user.
    #[error("Interrupted. Cancelling checks.")]
    Interrupted,

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Whether this error came from talking to the remote (network, auth,
    /// protocol or a stalled command) rather than from local state.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::GitCommand { .. } | Error::Timeout { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
