//! CLI argument parsing, logging setup and top-level error handling

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::commands;
use gitmon::error::Error;
use gitmon::exit_codes;

/// GitMon - The Git Repository Monitor
///
/// Fetches every configured repository and reports new commits, branches
/// and tags.
#[derive(Parser, Debug)]
#[command(name = "gitmon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    check: commands::check::CheckArgs,

    /// Show what is being checked
    #[arg(short, long)]
    verbose: bool,

    /// Show debugging output
    #[arg(long)]
    debug: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,
}

impl Cli {
    /// Execute the poll cycle
    pub fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.debug);

        match commands::check::execute(self.check, &self.color) {
            Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::Interrupted)) => {
                eprintln!("{}", e);
                std::process::exit(exit_codes::INTERRUPTED);
            }
            result => result,
        }
    }
}

fn level(verbose: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

fn init_logging(verbose: bool, debug: bool) {
    env_logger::Builder::new()
        .filter_level(level(verbose, debug))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}
