//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the gitmon
//! configuration file and the logic for parsing it.
//!
//! ## File Format
//!
//! The file is a flat list of `key = value` lines. Blank lines and lines
//! starting with `#` are ignored. A value may reference another key with
//! `${key}`, which is substituted once after the whole file is read:
//!
//! ```text
//! base = ~/code
//! max.new.commits = 10
//! repo.api.path = ${base}/api
//! repo.api.name = API server
//! scan.work.path = ${base}/work
//! scan.work.depth = 2
//! ```
//!
//! ## Key Components
//!
//! - **`Config`**: the fully typed configuration, built once at startup and
//!   passed by reference to everything that needs it.
//! - **`Settings`**: global behaviour switches and limits.
//! - **`RepositoryConfig`** / **`ScanRootConfig`**: the `repo.<id>.*` and
//!   `scan.<id>.*` groups, validated while parsing so that nothing later
//!   has to infer structure from key names.

use crate::defaults;
use crate::error::{Error, Result};
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which notifier delivers the rendered updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifierKind {
    /// Print to standard output.
    #[default]
    CommandLine,
    /// Desktop popup through `notify-send`.
    NotifySend,
    /// A user supplied shell command (`notifier.command`).
    Command,
}

impl NotifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifierKind::CommandLine => "command.line",
            NotifierKind::NotifySend => "notify.send",
            NotifierKind::Command => "command",
        }
    }
}

impl FromStr for NotifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "command.line" => Ok(NotifierKind::CommandLine),
            "notify.send" => Ok(NotifierKind::NotifySend),
            "command" => Ok(NotifierKind::Command),
            other => Err(Error::ConfigParse {
                message: format!("Unknown notifier.type '{}'", other),
                hint: Some("Use one of: command.line, notify.send, command".to_string()),
            }),
        }
    }
}

/// Global settings, immutable after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub notify_new_branch: bool,
    pub notify_new_tag: bool,
    pub auto_pull: bool,
    /// Upper bound on reported updates per repository, and on the history
    /// walked per branch.
    pub max_new_commits: usize,
    /// Changed files listed per commit. 0 lists all of them.
    pub max_files_info: usize,
    pub notifier: NotifierKind,
    pub notifier_command: Option<String>,
    pub icon_path: PathBuf,
    /// Time budget for one repository check. `None` disables it.
    pub fetch_timeout: Option<Duration>,
    pub max_parallel: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notify_new_branch: defaults::NOTIFY_NEW_BRANCH,
            notify_new_tag: defaults::NOTIFY_NEW_TAG,
            auto_pull: defaults::AUTO_PULL,
            max_new_commits: defaults::MAX_NEW_COMMITS,
            max_files_info: defaults::MAX_FILES_INFO,
            notifier: NotifierKind::default(),
            notifier_command: None,
            icon_path: defaults::default_icon_path(),
            fetch_timeout: Some(defaults::FETCH_TIMEOUT),
            max_parallel: defaults::MAX_PARALLEL,
        }
    }
}

/// An explicitly configured repository (`repo.<id>.*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub id: String,
    /// Display name, defaults to the id.
    pub name: String,
    /// Path as written in the configuration, before `~` expansion.
    pub path: String,
}

/// A directory that is searched for repositories (`scan.<id>.*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRootConfig {
    pub id: String,
    pub name: String,
    pub path: String,
    pub depth: usize,
}

/// The complete, typed configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub repositories: Vec<RepositoryConfig>,
    pub scan_roots: Vec<ScanRootConfig>,
}

/// Partially collected `<prefix>.<id>.*` group.
#[derive(Default)]
struct Group {
    path: Option<String>,
    name: Option<String>,
    depth: Option<String>,
}

/// Load and parse a configuration file.
pub fn from_file(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Parse configuration text into a typed `Config`.
pub fn parse(content: &str) -> Result<Config> {
    let pairs = substitute_variables(parse_pairs(content))?;
    debug!("Loaded config: {:?}", pairs);

    let settings = parse_settings(&pairs)?;

    let mut repos: BTreeMap<String, Group> = BTreeMap::new();
    let mut roots: BTreeMap<String, Group> = BTreeMap::new();

    for (key, value) in &pairs {
        let (groups, rest) = if let Some(rest) = key.strip_prefix("repo.") {
            (&mut repos, rest)
        } else if let Some(rest) = key.strip_prefix("scan.") {
            (&mut roots, rest)
        } else {
            continue;
        };

        let Some((id, field)) = rest.rsplit_once('.') else {
            warn!("Ignoring configuration key without a field: {}", key);
            continue;
        };
        let group = groups.entry(id.to_string()).or_default();
        match field {
            "path" => group.path = Some(value.clone()),
            "name" => group.name = Some(value.clone()),
            "depth" => group.depth = Some(value.clone()),
            _ => warn!("Ignoring unknown configuration key: {}", key),
        }
    }

    let mut repositories = Vec::new();
    for (id, group) in repos {
        let path = require_path("repo", &id, group.path)?;
        if group.depth.is_some() {
            warn!("repo.{}.depth has no effect", id);
        }
        repositories.push(RepositoryConfig {
            name: group.name.unwrap_or_else(|| id.clone()),
            id,
            path,
        });
    }

    let mut scan_roots = Vec::new();
    for (id, group) in roots {
        let path = require_path("scan", &id, group.path)?;
        let depth = match group.depth {
            Some(depth) => parse_count(&format!("scan.{}.depth", id), &depth)?,
            None => defaults::SCAN_DEPTH,
        };
        scan_roots.push(ScanRootConfig {
            name: group.name.unwrap_or_else(|| id.clone()),
            id,
            path,
            depth,
        });
    }

    Ok(Config {
        settings,
        repositories,
        scan_roots,
    })
}

/// Split configuration text into trimmed key/value pairs.
///
/// Later duplicates win. Lines without `=` are reported and skipped.
fn parse_pairs(content: &str) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.split_once('=') {
            Some((key, value)) => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => warn!("Bad configuration line: {}", trimmed),
        }
    }
    pairs
}

/// Replace `${key}` references with the raw value of `key`.
fn substitute_variables(pairs: BTreeMap<String, String>) -> Result<BTreeMap<String, String>> {
    let pattern = Regex::new(r"\$\{([^}]+)\}")?;
    let substituted = pairs
        .iter()
        .map(|(key, value)| {
            let replaced = pattern.replace_all(value, |caps: &regex::Captures| {
                match pairs.get(&caps[1]) {
                    Some(found) => found.clone(),
                    None => caps[0].to_string(),
                }
            });
            (key.clone(), replaced.into_owned())
        })
        .collect();
    Ok(substituted)
}

fn parse_settings(pairs: &BTreeMap<String, String>) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(value) = pairs.get("notify.new.branch") {
        settings.notify_new_branch = parse_bool("notify.new.branch", value)?;
    }
    if let Some(value) = pairs.get("notify.new.tag") {
        settings.notify_new_tag = parse_bool("notify.new.tag", value)?;
    }
    if let Some(value) = pairs.get("auto.pull") {
        settings.auto_pull = parse_bool("auto.pull", value)?;
    }
    if let Some(value) = pairs.get("max.new.commits") {
        settings.max_new_commits = parse_count("max.new.commits", value)?;
    }
    if let Some(value) = pairs.get("max.files.info") {
        settings.max_files_info = parse_count("max.files.info", value)?;
    }
    if let Some(value) = pairs.get("notifier.type") {
        settings.notifier = value.parse()?;
    }
    if let Some(value) = pairs.get("notifier.command") {
        settings.notifier_command = Some(value.clone());
    }
    if let Some(value) = pairs.get("notifier.icon") {
        settings.icon_path = defaults::expand_home(value);
    }
    if let Some(value) = pairs.get("fetch.timeout") {
        settings.fetch_timeout = match parse_count("fetch.timeout", value)? {
            0 => None,
            secs => Some(Duration::from_secs(secs as u64)),
        };
    }
    if let Some(value) = pairs.get("max.parallel") {
        settings.max_parallel = parse_count("max.parallel", value)?.max(1);
    }

    if settings.notifier == NotifierKind::Command && settings.notifier_command.is_none() {
        return Err(Error::ConfigParse {
            message: "notifier.type is 'command' but notifier.command is not set".to_string(),
            hint: Some(
                "Add 'notifier.command = ...'; it receives the title, body and icon as $1, $2 and $3"
                    .to_string(),
            ),
        });
    }

    Ok(settings)
}

fn require_path(prefix: &str, id: &str, path: Option<String>) -> Result<String> {
    match path {
        Some(path) if !path.is_empty() => Ok(path),
        _ => Err(Error::ConfigParse {
            message: format!("{}.{} has no path", prefix, id),
            hint: Some(format!("Add '{}.{}.path = <directory>'", prefix, id)),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::ConfigParse {
            message: format!("Invalid value for {}: '{}'", key, value),
            hint: Some("Use 1 or 0".to_string()),
        }),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.parse::<usize>().map_err(|_| Error::ConfigParse {
        message: format!("Invalid value for {}: '{}'", key, value),
        hint: Some("Expected a non-negative whole number".to_string()),
    })
}
