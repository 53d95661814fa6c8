//! End-to-end tests for CLI exit codes.
//!
//! These tests verify that the CLI returns the exit codes documented in
//! [`gitmon::exit_codes`]:
//!
//! - Exit code 0: Success, including repositories that failed to fetch
//! - Exit code 1: Missing or invalid configuration, no repositories
//! - Exit code 2: Invalid command-line usage (handled by clap)

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn gitmon() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gitmon");
    cmd.env_remove("GITMON_CONF").env_remove("RUST_LOG");
    cmd
}

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    gitmon()
        .arg("--help")
        .assert()
        .code(gitmon::exit_codes::SUCCESS)
        .stdout(predicate::str::contains("--config"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    gitmon()
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 1 is returned for configuration file not found.
#[test]
fn test_exit_code_error_config_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();

    gitmon()
        .arg("--config")
        .arg(temp.path().join("missing.conf"))
        .assert()
        .code(gitmon::exit_codes::ERROR)
        .stderr(predicate::str::contains("Configuration not found"));
}

/// Exit code 1 is returned when the configuration tracks nothing.
#[test]
fn test_exit_code_error_no_repositories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("gitmon.conf");
    config_file.write_str("max.new.commits = 3\n").unwrap();

    gitmon()
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no repositories"));
}

/// Exit code 1 is returned for an invalid setting value.
#[test]
fn test_exit_code_error_invalid_config() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("gitmon.conf");
    config_file
        .write_str("repo.api.path = /srv/api\nmax.new.commits = lots\n")
        .unwrap();

    gitmon()
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max.new.commits"));
}

/// The config path can come from the environment.
#[test]
fn test_config_from_environment() {
    let temp = assert_fs::TempDir::new().unwrap();

    gitmon()
        .env("GITMON_CONF", temp.path().join("env.conf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("env.conf"));
}

/// A repository that cannot be fetched is skipped, not fatal.
#[test]
fn test_exit_code_success_with_unreachable_repository() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config_file = temp.child("gitmon.conf");
    config_file
        .write_str(&format!(
            "repo.gone.path = {}\n",
            temp.path().join("gone").display()
        ))
        .unwrap();

    gitmon()
        .arg("--config")
        .arg(config_file.path())
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

/// Exit code 2 is returned for an unknown flag.
#[test]
fn test_exit_code_usage_unknown_flag() {
    gitmon()
        .arg("--no-such-flag")
        .assert()
        .code(gitmon::exit_codes::USAGE);
}
