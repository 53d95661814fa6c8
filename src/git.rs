//! Thin wrappers around the system `git` command.
//!
//! Using the installed `git` binary means fetches automatically pick up:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Any authentication configured in ~/.gitconfig
//!
//! Every command runs non-interactively (`GIT_TERMINAL_PROMPT=0`), is bounded
//! by an optional timeout and is killed as soon as the interrupt flag is set.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::debug;

use crate::defaults::REMOTE;
use crate::error::{Error, Result};
use crate::interrupt::InterruptFlag;
use crate::model::{Commit, CommitId, FileChange};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Limits applied to every git invocation.
#[derive(Debug, Clone, Default)]
pub struct GitOptions {
    /// Time budget for one repository check. `None` lets commands run until
    /// they finish.
    pub timeout: Option<Duration>,
    /// Absolute end of the current check, shared by all its commands. Unset,
    /// each command gets the full `timeout` on its own.
    pub deadline: Option<Instant>,
    pub interrupt: InterruptFlag,
}

impl GitOptions {
    /// Options for one repository check: the timeout starts counting now and
    /// covers every command that follows.
    pub fn for_cycle(&self) -> Self {
        Self {
            deadline: self.timeout.map(|t| Instant::now() + t),
            ..self.clone()
        }
    }

    fn command_deadline(&self) -> Option<Instant> {
        self.deadline
            .or_else(|| self.timeout.map(|t| Instant::now() + t))
    }
}

/// Captured result of a finished git command.
#[derive(Debug)]
pub struct GitOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `git <args>` inside `dir`, returning whatever it printed.
///
/// A non-zero exit status is not an error here; see [`run_checked`].
pub fn run(dir: &Path, args: &[&str], options: &GitOptions) -> Result<GitOutput> {
    options.interrupt.check()?;
    let command = args.join(" ");
    debug!("git {} (in {})", command, dir.display());

    let mut child = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    // Drain the pipes on their own threads so a chatty command cannot block
    // on a full pipe while we poll for its exit.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait(&mut child, &command, dir, options)?;

    Ok(GitOutput {
        status,
        stdout: join_drain(stdout),
        stderr: join_drain(stderr),
    })
}

/// Like [`run`], but a non-zero exit status becomes `Error::GitCommand`.
pub fn run_checked(dir: &Path, args: &[&str], options: &GitOptions) -> Result<String> {
    let output = run(dir, args, options)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            path: dir.display().to_string(),
            stderr: describe_failure(&output.stderr),
        });
    }
    Ok(output.stdout)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

fn wait(child: &mut Child, command: &str, dir: &Path, options: &GitOptions) -> Result<ExitStatus> {
    let deadline = options.command_deadline();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if options.interrupt.is_set() {
            kill(child);
            return Err(Error::Interrupted);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            kill(child);
            return Err(Error::Timeout {
                command: command.to_string(),
                path: dir.display().to_string(),
                seconds: options.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Make common remote failures readable.
fn describe_failure(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
        || stderr.contains("terminal prompts disabled")
    {
        format!(
            "Authentication failed. Make sure the remote is reachable without a prompt \
            (SSH agent, credential helper or token).\nError: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// List remote-tracking branches and tags as `(refname, commit)` pairs.
///
/// Annotated tags are peeled to the commit they point at.
pub fn list_refs(dir: &Path, options: &GitOptions) -> Result<Vec<(String, CommitId)>> {
    let remotes = format!("refs/remotes/{}", REMOTE);
    let stdout = run_checked(
        dir,
        &[
            "for-each-ref",
            "--format=%(objectname)%09%(*objectname)%09%(refname)",
            &remotes,
            "refs/tags",
        ],
        options,
    )?;
    Ok(parse_ref_list(&stdout))
}

fn parse_ref_list(stdout: &str) -> Vec<(String, CommitId)> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let object = fields.next()?;
            let peeled = fields.next()?;
            let refname = fields.next()?;
            let target = if peeled.is_empty() { object } else { peeled };
            if target.is_empty() || refname.is_empty() {
                return None;
            }
            Some((refname.to_string(), CommitId::new(target)))
        })
        .collect()
}

/// `git fetch --tags origin`
pub fn fetch(dir: &Path, options: &GitOptions) -> Result<()> {
    run_checked(dir, &["fetch", "--tags", REMOTE], options).map(|_| ())
}

/// `git pull --ff-only`; never creates a merge commit.
pub fn pull(dir: &Path, options: &GitOptions) -> Result<()> {
    run_checked(dir, &["pull", "--ff-only"], options).map(|_| ())
}

/// Whether `commit` is reachable from any of `tips`.
///
/// `rev-list <commit> --not <tips>` prints nothing exactly when every
/// commit reachable from `commit` is also reachable from a tip.
pub fn is_reachable_from(
    dir: &Path,
    commit: &CommitId,
    tips: &[CommitId],
    options: &GitOptions,
) -> Result<bool> {
    if tips.is_empty() {
        return Ok(false);
    }
    let mut args = vec!["rev-list", "-n", "1", commit.as_str(), "--not"];
    args.extend(tips.iter().map(CommitId::as_str));
    let stdout = run_checked(dir, &args, options)?;
    Ok(stdout.trim().is_empty())
}

/// Read a commit together with its per-file line counts against the first
/// parent.
pub fn show_commit(dir: &Path, id: &CommitId, options: &GitOptions) -> Result<Commit> {
    let header = run_checked(
        dir,
        &[
            "show",
            "-s",
            "--format=%H%x00%an%x00%ct%x00%P%x00%B",
            id.as_str(),
        ],
        options,
    )?;
    let mut commit = parse_commit_header(&header).ok_or_else(|| Error::GitCommand {
        command: format!("show -s {}", id),
        path: dir.display().to_string(),
        stderr: "unexpected commit format".to_string(),
    })?;

    let numstat = match &commit.parent {
        Some(parent) => run_checked(
            dir,
            &["diff-tree", "-r", "--numstat", parent.as_str(), commit.id.as_str()],
            options,
        )?,
        None => run_checked(
            dir,
            &["diff-tree", "-r", "--numstat", "--root", "--no-commit-id", commit.id.as_str()],
            options,
        )?,
    };
    commit.files = parse_numstat(&numstat);
    Ok(commit)
}

fn parse_commit_header(output: &str) -> Option<Commit> {
    let mut fields = output.splitn(5, '\0');
    let id = fields.next()?.trim();
    let author = fields.next()?.trim();
    let seconds: i64 = fields.next()?.trim().parse().ok()?;
    let parents = fields.next()?;
    let message = fields.next().unwrap_or_default().trim();

    Some(Commit {
        id: CommitId::new(id),
        author: author.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(seconds, 0)?,
        message: message.to_string(),
        parent: parents.split_whitespace().next().map(CommitId::new),
        files: Vec::new(),
    })
}

/// Parse `--numstat` lines. Binary files (`-`) count as zero lines.
fn parse_numstat(output: &str) -> Vec<FileChange> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let insertions = fields.next()?;
            let deletions = fields.next()?;
            let path = fields.next()?;
            Some(FileChange {
                path: path.to_string(),
                insertions: insertions.parse().unwrap_or(0),
                deletions: deletions.parse().unwrap_or(0),
            })
        })
        .collect()
}
