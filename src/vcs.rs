use crate::process::run_with_timeout;
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Somewhere the time of a project's latest commit can be read from.
pub trait CommitTimestampSource: Sync {
    /// Returns `None` when the project has no history or it can't be read.
    fn last_commit(&self, root: &Path) -> Option<DateTime<Utc>>;
}

/// Reads the commit time of `HEAD` through the `git` command line tool.
pub struct GitCli {
    pub timeout: Duration,
}

impl CommitTimestampSource for GitCli {
    fn last_commit(&self, root: &Path) -> Option<DateTime<Utc>> {
        // `.git` may be a file for worktrees and submodules.
        if !root.join(".git").exists() {
            return None;
        }
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(root)
            .args(["log", "-1", "--format=%ct"]);
        // Never pick up an enclosing repository in place of a broken one.
        if let Some(parent) = root.parent() {
            cmd.env("GIT_CEILING_DIRECTORIES", parent);
        }
        let output = run_with_timeout(&mut cmd, self.timeout)?;
        if !output.status.success() {
            tracing::debug!(
                root = %root.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git log failed"
            );
            return None;
        }
        parse_epoch(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let secs = s.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(secs, 0).single()
}
