use crate::checklist;
use crate::progress::{self, Progress, ProgressTier};
use crate::scan;
use crate::status::{self, Status};
use crate::utils;
use crate::vcs::CommitTimestampSource;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRecord {
    pub name: String,
    pub path: PathBuf,
    pub last_activity: DateTime<Utc>,
    pub progress: Progress,
    pub status: Status,
}

/// Where the per-project signals come from.
pub struct Signals<'a> {
    pub commits: &'a dyn CommitTimestampSource,
    /// Progress tiers in order of precedence.
    pub progress: &'a [&'a dyn ProgressTier],
    /// The date statuses are judged against.
    pub today: NaiveDate,
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Builds the record of a single project, or `None` if its root is gone.
pub fn scan_project(root: &Path, signals: &Signals) -> Option<ProjectRecord> {
    let path = match fs::canonicalize(root) {
        Ok(path) if path.is_dir() => path,
        _ => {
            tracing::info!(path = %root.display(), "skipping missing project");
            return None;
        }
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // The checklist's own edits are accounted for by its declared date.
    let checklist_path = checklist::locate(&path);
    let ignore: HashSet<PathBuf> = checklist_path.iter().cloned().collect();
    let mtime = match scan::latest_mtime(&path, &ignore) {
        Ok(mtime) => mtime,
        Err(err) => {
            tracing::info!(path = %path.display(), error = %err, "skipping vanished project");
            return None;
        }
    };
    let declared = checklist_path
        .as_deref()
        .and_then(checklist::read)
        .and_then(|text| checklist::declared_date(&text))
        .and_then(midnight_utc);
    let commit = signals.commits.last_commit(&path);
    let last_activity = commit.into_iter().chain(declared).fold(mtime, std::cmp::max);

    let progress = progress::progress(&path, signals.progress);
    let status = status::status(&path, signals.today);

    Some(ProjectRecord {
        name,
        path,
        last_activity,
        progress,
        status,
    })
}

/// Scans every project root and returns their records, most recently
/// active first. Roots with equal activity keep their given order.
pub fn collect_projects(roots: &[PathBuf], signals: &Signals, quiet: bool) -> Vec<ProjectRecord> {
    let progress = utils::create_progress_bar(quiet, roots.len());
    let mut records: Vec<ProjectRecord> = roots
        .par_iter()
        .filter_map(|root| {
            let record = scan_project(root, signals);
            progress.inc(1);
            record
        })
        .collect();
    progress.finish_and_clear();

    records.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    records
}
