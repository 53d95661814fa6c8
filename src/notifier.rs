//! # Notifiers
//!
//! A [`Notifier`] delivers one rendered batch: a title
//! (`"<name>\n<path>"`), a body and an icon path. The implementation is
//! chosen by `notifier.type`:
//!
//! - `command.line` – [`CommandLineNotifier`], prints to stdout.
//! - `notify.send` – [`NotifySendNotifier`], a desktop popup via `notify-send`.
//! - `command` – [`CommandNotifier`], runs `notifier.command` with `sh -c`.
//!
//! The custom command receives the title, body and icon as positional
//! parameters `$1`, `$2`, `$3` and as the `GITMON_TITLE`, `GITMON_BODY` and
//! `GITMON_ICON` environment variables. Commit messages come from the remote,
//! so they are never spliced into the command text itself.

use crate::config::{NotifierKind, Settings};
use crate::error::{Error, Result};
use crate::output::{self, OutputConfig};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, icon: &Path) -> Result<()>;
}

/// Build the notifier selected in `settings`.
pub fn create(settings: &Settings, output: OutputConfig) -> Result<Box<dyn Notifier>> {
    Ok(match settings.notifier {
        NotifierKind::CommandLine => Box::new(CommandLineNotifier::new(output)),
        NotifierKind::NotifySend => Box::new(NotifySendNotifier),
        NotifierKind::Command => {
            let command = settings.notifier_command.clone().ok_or_else(|| Error::ConfigParse {
                message: "notifier.command is not set".to_string(),
                hint: None,
            })?;
            Box::new(CommandNotifier::new(command))
        }
    })
}

/// Prints notifications to standard output.
pub struct CommandLineNotifier {
    output: OutputConfig,
}

impl CommandLineNotifier {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn format(&self, title: &str, body: &str) -> String {
        format!("{}\n{}\n", output::bold(&self.output, title), body)
    }
}

impl Notifier for CommandLineNotifier {
    fn notify(&self, title: &str, body: &str, _icon: &Path) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", self.format(title, body))?;
        stdout.flush()?;
        Ok(())
    }
}

/// Desktop notification through `notify-send`.
pub struct NotifySendNotifier;

impl Notifier for NotifySendNotifier {
    fn notify(&self, title: &str, body: &str, icon: &Path) -> Result<()> {
        let mut command = Command::new("notify-send");
        command.arg("-i").arg(icon).arg(title).arg(body);
        run_notifier(NotifierKind::NotifySend.as_str(), command)
    }
}

/// Runs a user supplied shell command.
pub struct CommandNotifier {
    command: String,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn build(&self, title: &str, body: &str, icon: &Path) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .arg("gitmon")
            .arg(title)
            .arg(body)
            .arg(icon)
            .env("GITMON_TITLE", title)
            .env("GITMON_BODY", body)
            .env("GITMON_ICON", icon);
        command
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, body: &str, icon: &Path) -> Result<()> {
        run_notifier(NotifierKind::Command.as_str(), self.build(title, body, icon))
    }
}

fn run_notifier(name: &str, mut command: Command) -> Result<()> {
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::Notify {
            notifier: name.to_string(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(Error::Notify {
            notifier: name.to_string(),
            message: format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_command_line_format() {
        let notifier = CommandLineNotifier::new(OutputConfig::without_color());
        assert_eq!(
            notifier.format("api\n/srv/api", "[main]\n..."),
            "api\n/srv/api\n[main]\n...\n"
        );
    }

    #[test]
    fn test_create_selects_kind() {
        let settings = Settings {
            notifier: NotifierKind::Command,
            notifier_command: None,
            ..Settings::default()
        };
        assert!(create(&settings, OutputConfig::without_color()).is_err());

        let settings = Settings::default();
        assert!(create(&settings, OutputConfig::without_color()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_passes_arguments_and_env() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.txt");
        let script = format!(
            "printf '%s|%s|%s|%s' \"$1\" \"$2\" \"$3\" \"$GITMON_TITLE\" > '{}'",
            out.display()
        );
        let notifier = CommandNotifier::new(script);

        notifier
            .notify("api", "it's $(not) `run`", Path::new("/icons/git.png"))
            .unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "api|it's $(not) `run`|/icons/git.png|api");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_failure() {
        let notifier = CommandNotifier::new("exit 3");
        let err = notifier
            .notify("t", "b", Path::new("icon"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Notify { ref notifier, .. } if notifier == "command"
        ));
    }
}
