//! # Check Command Implementation
//!
//! Loads the configuration, resolves the repositories to track and runs one
//! poll cycle over them, handing every non-empty result to the configured
//! notifier.
//!
//! Fatal conditions are a missing or invalid configuration and a
//! configuration without repositories. Failures of individual repositories
//! are logged and do not change the exit status.

use anyhow::Result;
use clap::Args;
use log::info;
use std::path::PathBuf;

use gitmon::config;
use gitmon::defaults;
use gitmon::discovery;
use gitmon::error::Error;
use gitmon::git::GitOptions;
use gitmon::interrupt::InterruptFlag;
use gitmon::notifier;
use gitmon::output::OutputConfig;
use gitmon::repository::SystemGitProvider;
use gitmon::runner::Runner;

/// Arguments selecting what to check
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the configuration file [default: ~/.gitmon.conf]
    #[arg(short, long, value_name = "PATH", env = defaults::CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

/// Execute one poll cycle.
pub fn execute(args: CheckArgs, color: &str) -> Result<()> {
    info!("GitMon v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .map(|path| defaults::expand_home(&path.to_string_lossy()))
        .unwrap_or_else(defaults::default_config_path);
    info!("Loading configuration from {}", config_path.display());
    let config = config::from_file(&config_path)?;

    let repos = discovery::discover(&config);
    if repos.is_empty() {
        return Err(Error::NoRepositories.into());
    }
    info!("Configuration OK, tracking {} repositories", repos.len());

    let interrupt = InterruptFlag::new();
    interrupt.install()?;

    let settings = &config.settings;
    let provider = SystemGitProvider::new(GitOptions {
        timeout: settings.fetch_timeout,
        deadline: None,
        interrupt: interrupt.clone(),
    });
    let notifier = notifier::create(settings, OutputConfig::from_env_and_flag(color))?;

    let report = Runner::new(&provider, notifier.as_ref(), settings, interrupt).run(&repos)?;
    info!(
        "Checked {} repositories: {} with updates, {} failed",
        report.checked, report.updated, report.failed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_execute_missing_config() {
        let args = CheckArgs {
            config: Some(PathBuf::from("/nonexistent/gitmon.conf")),
        };

        let err = execute(args, "never").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_execute_without_repositories() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gitmon.conf");
        fs::write(&config_path, "max.new.commits = 3\n").unwrap();

        let err = execute(
            CheckArgs {
                config: Some(config_path),
            },
            "never",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoRepositories)
        ));
    }

    #[test]
    fn test_execute_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gitmon.conf");
        fs::write(&config_path, "max.new.commits = many\n").unwrap();

        let err = execute(
            CheckArgs {
                config: Some(config_path),
            },
            "never",
        )
        .unwrap_err();
        assert!(err.to_string().contains("max.new.commits"));
    }
}
