//! Plain-text rendering of an [`UpdateBatch`] for notifiers.
//!
//! ```text
//! [main]
//! ----------
//! 2024-03-01 12:00:00
//! Jane Doe: Fix parser
//! Files:
//! [10+ 2-] src/lib.rs
//! (2 more files)
//! ```

use crate::repository::Repository;
use crate::updates::{BranchUpdate, Update, UpdateBatch};

const SEPARATOR: &str = "----------";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Notification title: repository name and path on separate lines.
pub fn title(repo: &Repository) -> String {
    format!("{}\n{}", repo.name, repo.path.display())
}

/// Notification body for a whole batch.
///
/// `max_files` limits the file lines per commit; 0 lists every file.
pub fn body(batch: &UpdateBatch, max_files: usize) -> String {
    batch
        .iter()
        .map(|group| render_group(group, max_files))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub fn render_group(group: &BranchUpdate, max_files: usize) -> String {
    let updates: Vec<String> = group
        .updates
        .iter()
        .map(|update| render_update(update, max_files))
        .collect();
    format!(
        "[{}]{}\n{}\n",
        group.name,
        group.category.suffix(),
        updates.join("\n")
    )
}

pub fn render_update(update: &Update, max_files: usize) -> String {
    let mut text = format!(
        "{}\n{}\n{}: {}",
        SEPARATOR,
        update.timestamp().format(DATE_FORMAT),
        update.author().trim(),
        update.message()
    );

    let files = update.files();
    if files.is_empty() {
        return text;
    }

    let shown = if max_files == 0 {
        files.len()
    } else {
        files.len().min(max_files)
    };
    text.push_str("\nFiles:");
    for file in &files[..shown] {
        text.push_str(&format!(
            "\n[{}+ {}-] {}",
            file.insertions, file.deletions, file.path
        ));
    }
    let hidden = files.len() - shown;
    if hidden > 0 {
        text.push_str(&format!(
            "\n({} more {})",
            hidden,
            if hidden > 1 { "files" } else { "file" }
        ));
    }
    text
}
