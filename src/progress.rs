//! Completion progress of a project.
//!
//! Progress comes from an ordered list of tiers; the first tier which
//! produces a value decides. Tiers are never combined.

use crate::checklist;
use crate::testrun::{TestResultSource, ACCEPTANCE_TEST_PATH};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Percentage in [0, 100], rounded to two decimals.
    Percent(f64),
    Unknown,
}

impl Progress {
    fn from_ratio(ratio: f64) -> Self {
        Progress::Percent((ratio * 100.0).round() / 100.0)
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Progress::Percent(p) => Some(*p),
            Progress::Unknown => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Progress::Percent(p) => write!(f, "{}%", p),
            Progress::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.percent().serialize(serializer)
    }
}

/// One source of completion information.
pub trait ProgressTier: Sync {
    fn name(&self) -> &'static str;
    /// Percentage of completion, `None` when this tier has nothing to say.
    fn measure(&self, root: &Path) -> Option<f64>;
}

/// Pass ratio of the project's acceptance test suite.
pub struct AcceptanceTests<'a> {
    pub source: &'a dyn TestResultSource,
}

impl ProgressTier for AcceptanceTests<'_> {
    fn name(&self) -> &'static str {
        "acceptance tests"
    }

    fn measure(&self, root: &Path) -> Option<f64> {
        let artifact = root.join(ACCEPTANCE_TEST_PATH);
        if !artifact.is_file() {
            return None;
        }
        self.source.run(root, &artifact)?.ratio()
    }
}

/// Ratio of ticked boxes in the project's acceptance checklist.
pub struct Checklist;

impl ProgressTier for Checklist {
    fn name(&self) -> &'static str {
        "checklist"
    }

    fn measure(&self, root: &Path) -> Option<f64> {
        let text = checklist::read(&checklist::locate(root)?)?;
        checklist::count_markers(&text).ratio()
    }
}

/// Asks each tier in turn and keeps the first answer.
pub fn progress(root: &Path, tiers: &[&dyn ProgressTier]) -> Progress {
    for tier in tiers {
        if let Some(ratio) = tier.measure(root) {
            tracing::debug!(root = %root.display(), tier = tier.name(), ratio, "progress");
            return Progress::from_ratio(ratio);
        }
    }
    Progress::Unknown
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testrun::TestSummary;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Test source which returns a fixed result and counts its runs.
    pub struct FakeTests {
        pub summary: Option<TestSummary>,
        pub runs: AtomicUsize,
    }

    impl FakeTests {
        pub fn new(summary: Option<TestSummary>) -> Self {
            FakeTests {
                summary,
                runs: AtomicUsize::new(0),
            }
        }
    }

    impl TestResultSource for FakeTests {
        fn run(&self, _root: &Path, artifact: &Path) -> Option<TestSummary> {
            assert!(artifact.is_file());
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.summary
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn checklist_with(done: usize, todo: usize) -> String {
        let mut text = String::from("# Acceptance\n");
        for i in 0..done {
            text.push_str(if i % 2 == 0 { "- [x] done\n" } else { "- [X] done\n" });
        }
        for _ in 0..todo {
            text.push_str("- [ ] todo\n");
        }
        text
    }

    fn measure(root: &Path, tests: &FakeTests) -> Progress {
        progress(root, &[&AcceptanceTests { source: tests }, &Checklist])
    }

    #[test]
    fn test_checklist_ratio() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/acceptance_checklist.md", &checklist_with(3, 7));
        let tests = FakeTests::new(None);
        assert_eq!(measure(dir.path(), &tests), Progress::Percent(30.0));
        // No suite on disk, so the runner is never asked.
        assert_eq!(tests.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/planning/acceptance.md", &checklist_with(1, 2));
        assert_eq!(
            progress(dir.path(), &[&Checklist]),
            Progress::Percent(33.33)
        );
        write(dir.path(), "docs/planning/acceptance.md", &checklist_with(2, 1));
        assert_eq!(
            progress(dir.path(), &[&Checklist]),
            Progress::Percent(66.67)
        );
    }

    #[test]
    fn test_planning_checklist_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/planning/acceptance.md", &checklist_with(1, 0));
        write(dir.path(), "docs/acceptance_checklist.md", &checklist_with(0, 1));
        assert_eq!(progress(dir.path(), &[&Checklist]), Progress::Percent(100.0));
    }

    #[test]
    fn test_no_markers_is_unknown() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/acceptance_checklist.md", "Last modified: 2024-01-01\n");
        assert_eq!(measure(dir.path(), &FakeTests::new(None)), Progress::Unknown);
    }

    #[test]
    fn test_no_signal_is_unknown() {
        let dir = TempDir::new().unwrap();
        assert_eq!(measure(dir.path(), &FakeTests::new(None)), Progress::Unknown);
    }

    #[test]
    fn test_tests_override_checklist() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ACCEPTANCE_TEST_PATH, "def test_it(): pass\n");
        write(dir.path(), "docs/acceptance_checklist.md", &checklist_with(3, 7));
        let tests = FakeTests::new(Some(TestSummary {
            passed: 8,
            failed: 2,
        }));
        assert_eq!(measure(dir.path(), &tests), Progress::Percent(80.0));
        assert_eq!(tests.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_or_empty_run_falls_through() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ACCEPTANCE_TEST_PATH, "");
        write(dir.path(), "docs/acceptance_checklist.md", &checklist_with(1, 3));

        let broken = FakeTests::new(None);
        assert_eq!(measure(dir.path(), &broken), Progress::Percent(25.0));

        let empty = FakeTests::new(Some(TestSummary::default()));
        assert_eq!(measure(dir.path(), &empty), Progress::Percent(25.0));
        assert_eq!(empty.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Progress::Percent(42.5).to_string(), "42.5%");
        assert_eq!(Progress::Unknown.to_string(), "Unknown");
        assert_eq!(serde_json::to_string(&Progress::Percent(80.0)).unwrap(), "80.0");
        assert_eq!(serde_json::to_string(&Progress::Unknown).unwrap(), "null");
    }
}
