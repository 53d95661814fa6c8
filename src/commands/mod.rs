//! # CLI Command Implementations
//!
//! `gitmon` has a single mode of operation: one poll cycle over every
//! configured repository. Its arguments and `execute` function live in
//! [`check`], which orchestrates the `gitmon` library to do the work.

pub mod check;
