//! Process exit codes used by the `gitmon` binary.
//!
//! - `0`: the run completed, or `--help` / `--version` was printed
//! - `1`: a fatal error, such as a missing configuration or no repositories
//! - `2`: invalid command-line usage (reported by clap)
//! - `130`: the run was interrupted by the user

/// The run completed normally.
pub const SUCCESS: i32 = 0;

/// A fatal error aborted the run.
pub const ERROR: i32 = 1;

/// Invalid command-line usage.
pub const USAGE: i32 = 2;

/// The user interrupted the run (128 + SIGINT).
pub const INTERRUPTED: i32 = 130;
