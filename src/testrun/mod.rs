mod parser;

use crate::process::run_with_timeout;
use combine::Parser;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Acceptance test suite location relative to the project root.
pub const ACCEPTANCE_TEST_PATH: &str = "tests/acceptance.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestSummary {
    pub passed: u32,
    pub failed: u32,
}

impl TestSummary {
    /// Percentage of passing tests, `None` if no test ran.
    pub fn ratio(&self) -> Option<f64> {
        let total = u64::from(self.passed) + u64::from(self.failed);
        if total == 0 {
            return None;
        }
        Some((u64::from(self.passed) * 100) as f64 / total as f64)
    }
}

/// Somewhere the outcome of a project's acceptance tests can be read from.
pub trait TestResultSource: Sync {
    /// Runs the suite at `artifact` for the project at `root`. Returns `None`
    /// if the suite couldn't be run or produced no recognizable tally.
    fn run(&self, root: &Path, artifact: &Path) -> Option<TestSummary>;
}

/// Runs a test command with the suite path appended and reads the tally
/// it prints at the end.
pub struct CommandRunner {
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl TestResultSource for CommandRunner {
    fn run(&self, root: &Path, artifact: &Path) -> Option<TestSummary> {
        let (program, args) = self.command.split_first()?;
        let output = run_with_timeout(
            Command::new(program)
                .args(args)
                .arg(artifact)
                .current_dir(root),
            self.timeout,
        )?;
        // Runners exit non-zero when tests fail, so the status is no guide.
        let summary = parse_output(&output.stdout);
        if summary.is_none() {
            tracing::debug!(
                root = %root.display(),
                status = %output.status,
                "no test tally in runner output"
            );
        }
        summary
    }
}

/// Finds the last tally line in the output of a test runner.
///
/// Decoration such as `=====` around the line is ignored. `passed` counts as
/// a pass; `failed`, `error` and `errors` count as failures. Other outcomes
/// (skipped, xfailed, warnings, ...) are ignored, and a line which has none
/// of the counted ones is not a tally.
pub fn parse_output(output: &[u8]) -> Option<TestSummary> {
    output.split(|&b| b == b'\n').rev().find_map(parse_line)
}

fn parse_line(line: &[u8]) -> Option<TestSummary> {
    let line = trim_decoration(line);
    let outcomes = match parser::summary().parse(line) {
        Ok((outcomes, b"")) => outcomes,
        _ => return None,
    };
    let mut summary = TestSummary::default();
    let mut counted = false;
    for (n, word) in outcomes {
        match word {
            b"passed" => summary.passed = summary.passed.saturating_add(n),
            b"failed" | b"error" | b"errors" => {
                summary.failed = summary.failed.saturating_add(n)
            }
            _ => continue,
        }
        counted = true;
    }
    if counted {
        Some(summary)
    } else {
        None
    }
}

fn trim_decoration(line: &[u8]) -> &[u8] {
    let is_decoration = |b: &u8| *b == b'=' || b.is_ascii_whitespace();
    let start = line.iter().position(|b| !is_decoration(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !is_decoration(b)).map_or(start, |i| i + 1);
    &line[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(passed: u32, failed: u32) -> Option<TestSummary> {
        Some(TestSummary { passed, failed })
    }

    #[test]
    fn test_parse_line() {
        let testcases: Vec<(&[u8], _)> = vec![
            (b"8 passed, 2 failed", summary(8, 2)),
            (b"8 passed, 2 failed in 0.12s", summary(8, 2)),
            (
                b"===== 2 failed, 8 passed, 1 skipped in 1.02s =====",
                summary(8, 2),
            ),
            (b"5 passed in 0.01s\r", summary(5, 0)),
            (b"1 failed, 3 passed, 2 errors, 4 warnings", summary(3, 3)),
            (b"1 error in 0.30s", summary(0, 1)),
            (b"10 passed, 1 xfailed", summary(10, 0)),
        ];
        for (line, expected) in testcases {
            assert_eq!(
                parse_line(line),
                expected,
                "{}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn test_not_parsed() {
        let testcases: &[&[u8]] = &[
            b"",
            b"no tests ran in 0.01s",
            b"3 skipped in 0.01s",
            b"collected 10 items",
            b"8 passed, 2 failed and then some",
            b"passed: 8",
        ];
        for line in testcases {
            assert_eq!(parse_line(line), None, "{}", String::from_utf8_lossy(line));
        }
    }

    #[test]
    fn test_parse_output_takes_last_tally() {
        let output = b"\
============================= test session starts ==============================
collected 10 items

tests/acceptance.py ........FF                                           [100%]

=================================== FAILURES ===================================
_________________________________ test_export __________________________________
E   AssertionError: 1 passed, 0 failed
========================= 8 passed, 2 failed in 0.12s ==========================
";
        assert_eq!(parse_output(output), summary(8, 2));
        assert_eq!(parse_output(b"nothing useful\n"), None);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(TestSummary { passed: 8, failed: 2 }.ratio(), Some(80.0));
        assert_eq!(TestSummary { passed: 0, failed: 0 }.ratio(), None);
        assert_eq!(TestSummary { passed: 0, failed: 4 }.ratio(), Some(0.0));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_runner() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = CommandRunner {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo '=== 3 passed, 1 failed in 0.5s ==='; exit 1".to_string(),
            ],
            timeout: Duration::from_secs(10),
        };
        let artifact = dir.path().join(ACCEPTANCE_TEST_PATH);
        assert_eq!(runner.run(dir.path(), &artifact), summary(3, 1));

        let silent = CommandRunner {
            command: vec!["true".to_string()],
            timeout: Duration::from_secs(10),
        };
        assert_eq!(silent.run(dir.path(), &artifact), None);

        let empty = CommandRunner {
            command: vec![],
            timeout: Duration::from_secs(10),
        };
        assert_eq!(empty.run(dir.path(), &artifact), None);
    }
}
