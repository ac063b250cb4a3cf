use crate::checklist;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Active,
    Dormant,
    Stale,
    Abandoned,
    Unknown,
}

impl Status {
    /// Classifies a project by whole days since its checklist was last
    /// touched. Future dates give negative days, which count as active.
    pub fn from_elapsed_days(days: i64) -> Self {
        match days {
            i64::MIN..=29 => Status::Active,
            30..=179 => Status::Dormant,
            180..=364 => Status::Stale,
            _ => Status::Abandoned,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Dormant => "Dormant",
            Status::Stale => "Stale",
            Status::Abandoned => "Abandoned",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status of the project at `root` as of `today`, judged only by the date
/// declared in its checklist.
pub fn status(root: &Path, today: NaiveDate) -> Status {
    match checklist::project_declared_date(root) {
        Some(date) => Status::from_elapsed_days((today - date).num_days()),
        None => Status::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn project_with(checklist: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/acceptance_checklist.md"), checklist).unwrap();
        dir
    }

    #[test]
    fn test_thresholds() {
        let testcases = [
            (-400, Status::Active),
            (-1, Status::Active),
            (0, Status::Active),
            (29, Status::Active),
            (30, Status::Dormant),
            (179, Status::Dormant),
            (180, Status::Stale),
            (364, Status::Stale),
            (365, Status::Abandoned),
            (5000, Status::Abandoned),
        ];
        for (days, expected) in testcases {
            assert_eq!(Status::from_elapsed_days(days), expected, "{} days", days);
        }
    }

    #[test]
    fn test_old_checklist_is_abandoned() {
        let dir = project_with("Last modified: 2023-01-01\n- [ ] ship\n");
        assert_eq!(status(dir.path(), today()), Status::Abandoned);
    }

    #[test]
    fn test_recent_checklist_is_active() {
        let date = today() - Duration::days(10);
        let dir = project_with(&format!("Last modified: {}\n", date.format("%Y-%m-%d")));
        assert_eq!(status(dir.path(), today()), Status::Active);
    }

    #[test]
    fn test_future_date_is_active() {
        let dir = project_with("Last modified: 2030-01-01\n");
        assert_eq!(status(dir.path(), today()), Status::Active);
    }

    #[test]
    fn test_missing_or_undated_checklist_is_unknown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "fresh").unwrap();
        assert_eq!(status(dir.path(), today()), Status::Unknown);

        let dir = project_with("- [x] no date here\n");
        assert_eq!(status(dir.path(), today()), Status::Unknown);

        let dir = project_with("Last modified: 2025-13-01\n");
        assert_eq!(status(dir.path(), today()), Status::Unknown);
    }
}
