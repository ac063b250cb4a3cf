//! Creation of acceptance checklists for projects which lack one.

use crate::checklist;
use crate::project::ProjectRecord;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Template used when no other is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/acceptance_checklist.md");

/// Where new checklists are created, relative to the project root.
const NEW_CHECKLIST_PATH: &str = "docs/acceptance_checklist.md";

static LAST_MODIFIED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Last modified: \d{4}-\d{2}-\d{2}").unwrap());

/// Fills the template's `Last modified:` lines with `date`.
pub fn fill_template(template: &str, date: NaiveDate) -> String {
    let line = format!("Last modified: {}", date.format("%Y-%m-%d"));
    LAST_MODIFIED_LINE
        .replace_all(template, regex::NoExpand(&line))
        .into_owned()
}

fn create_checklist(root: &Path, content: &str) -> Result<PathBuf> {
    let path = root.join(NEW_CHECKLIST_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Creates a checklist for every project without one, dated with the
/// project's last activity. Nothing is written unless `write` is set.
///
/// Returns how many checklists were (or would have been) created.
pub fn init_checklists(records: &[ProjectRecord], template: &str, write: bool) -> usize {
    let mut created = 0;
    for record in records {
        if checklist::locate(&record.path).is_some() {
            println!("Checklist already exists for {}", record.name);
            continue;
        }
        let date = record.last_activity.with_timezone(&Local).date_naive();
        let content = fill_template(template, date);
        if !write {
            println!("Would create checklist for {}", record.name);
            created += 1;
            continue;
        }
        match create_checklist(&record.path, &content) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "created checklist");
                println!("Created checklist for {}", record.name);
                created += 1;
            }
            Err(err) => {
                tracing::error!(project = %record.name, "{:#}", err);
            }
        }
    }
    created
}
