use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Returns the most recent modification time of `root` and everything
/// below it.
///
/// Hidden entries (leading dot) are pruned together with their subtree,
/// which keeps VCS internals, virtualenvs and caches out of the result.
/// Paths in `ignore` are skipped as well. Entries which vanish or cannot be
/// stat'd during the walk are skipped; only a failure to stat `root`
/// itself is reported.
pub fn latest_mtime(root: &Path, ignore: &HashSet<PathBuf>) -> io::Result<DateTime<Utc>> {
    let root = resolve(root);
    let mut latest: DateTime<Utc> = fs::metadata(&root)?.modified()?.into();
    let ignore: HashSet<PathBuf> = ignore.iter().map(|p| resolve(p)).collect();

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || (!is_hidden(entry) && !ignore.contains(entry.path()))
        });
    for entry in walker {
        let mtime = entry
            .map_err(io::Error::from)
            .and_then(|entry| Ok(entry.metadata()?.modified()?));
        match mtime {
            Ok(mtime) => latest = latest.max(mtime.into()),
            Err(err) => tracing::debug!(root = %root.display(), error = %err, "skipping entry"),
        }
    }
    Ok(latest)
}
