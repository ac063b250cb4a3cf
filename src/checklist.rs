//! Acceptance checklist documents.
//!
//! A checklist is a Markdown file with `[x]` / `[ ]` task markers and an
//! optional `Last modified: YYYY-MM-DD` line. It lives either at the newer
//! planning location or at the legacy one; the former wins.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Checklist paths relative to the project root, in order of preference.
pub const CHECKLIST_PATHS: [&str; 2] = [
    "docs/planning/acceptance.md",
    "docs/acceptance_checklist.md",
];

static DONE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[x\]").unwrap());
static LAST_MODIFIED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Last modified:\s*(\d{4}-\d{2}-\d{2})").unwrap());

const TODO_MARKER: &str = "[ ]";

/// Finds the checklist of the project at `root`, if it has one.
pub fn locate(root: &Path) -> Option<PathBuf> {
    CHECKLIST_PATHS
        .iter()
        .map(|rel| root.join(rel))
        .find(|path| path.is_file())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    pub done: usize,
    pub todo: usize,
}

impl Markers {
    /// Percentage of done markers, `None` if there are none at all.
    pub fn ratio(&self) -> Option<f64> {
        let total = self.done + self.todo;
        if total == 0 {
            return None;
        }
        Some((self.done * 100) as f64 / total as f64)
    }
}

pub fn count_markers(text: &str) -> Markers {
    Markers {
        done: DONE_MARKER.find_iter(text).count(),
        todo: text.matches(TODO_MARKER).count(),
    }
}

/// The date from the first `Last modified:` line. A well-formed but
/// impossible date such as 2023-02-30 counts as absent.
pub fn declared_date(text: &str) -> Option<NaiveDate> {
    let caps = LAST_MODIFIED.captures(text)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

/// Reads the checklist at `path`, logging and swallowing any failure.
pub fn read(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "unreadable checklist");
            None
        }
    }
}

/// Locates and reads the declared date of the project's checklist.
pub fn project_declared_date(root: &Path) -> Option<NaiveDate> {
    declared_date(&read(&locate(root)?)?)
}
