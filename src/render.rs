use crate::progress::Progress;
use crate::project::ProjectRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

pub const DASHBOARD_FILE: &str = "dashboard.html";
pub const STYLES_FILE: &str = "styles.css";

const DEFAULT_STYLES: &str = "\
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    margin: 0;
    padding: 20px;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
    min-height: 100vh;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
}

header {
    text-align: center;
    margin-bottom: 30px;
    padding: 20px;
    background: rgba(255, 255, 255, 0.1);
    border-radius: 10px;
}

.card {
    background: rgba(255, 255, 255, 0.1);
    border-radius: 10px;
    padding: 20px;
}

.project-item {
    padding: 10px 0;
    border-bottom: 1px solid rgba(255, 255, 255, 0.2);
}

.project-item .path {
    font-size: 0.8em;
    opacity: 0.7;
}

.status {
    float: right;
    font-size: 0.9em;
}

.progress-bar {
    height: 8px;
    margin-top: 6px;
    background: rgba(255, 255, 255, 0.2);
    border-radius: 4px;
    overflow: hidden;
}

.progress-fill {
    height: 100%;
    background: #4ade80;
}

.timestamp {
    text-align: center;
    margin-top: 20px;
    opacity: 0.7;
}
";

fn escape(s: &str) -> Cow<str> {
    if !s.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

fn render_project(out: &mut String, record: &ProjectRecord) -> fmt::Result {
    let last_activity = record.last_activity.with_timezone(&Local);
    writeln!(out, "<div class=\"project-item\">")?;
    writeln!(
        out,
        "<span class=\"status status-{}\">{}</span>",
        record.status.label().to_lowercase(),
        record.status
    )?;
    writeln!(out, "<h3>{}</h3>", escape(&record.name))?;
    writeln!(
        out,
        "<div class=\"path\">{}</div>",
        escape(&record.path.to_string_lossy())
    )?;
    writeln!(
        out,
        "<div class=\"last-activity\">Last activity: {}</div>",
        last_activity.format("%Y-%m-%d %H:%M")
    )?;
    writeln!(out, "<div class=\"progress\">Progress: {}</div>", record.progress)?;
    if let Progress::Percent(p) = record.progress {
        writeln!(
            out,
            "<div class=\"progress-bar\"><div class=\"progress-fill\" style=\"width: {}%\"></div></div>",
            p
        )?;
    }
    writeln!(out, "</div>")
}

/// Renders the whole dashboard page.
pub fn render_dashboard(
    records: &[ProjectRecord],
    generated_at: DateTime<Local>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(
        out,
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>Dashboard</title>
<link rel=\"stylesheet\" href=\"{}\">
</head>
<body>
<div class=\"container\">
<header>
<h1>Dashboard</h1>
<div class=\"date\">{}</div>
</header>
<section class=\"card projects\">
<h2>Projects</h2>
",
        STYLES_FILE,
        generated_at.format("%A, %B %d, %Y"),
    )?;
    if records.is_empty() {
        writeln!(out, "<p class=\"empty\">No projects found.</p>")?;
    }
    for record in records {
        render_project(&mut out, record)?;
    }
    write!(
        out,
        "</section>
<div class=\"timestamp\">Last updated: {}</div>
</div>
</body>
</html>
",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
    )?;
    Ok(out)
}

/// Writes the dashboard and its stylesheet into `dir`.
///
/// `stylesheet` is copied when given and readable; otherwise the built-in
/// styles are written.
pub fn write_report(
    dir: &Path,
    records: &[ProjectRecord],
    generated_at: DateTime<Local>,
    stylesheet: Option<&Path>,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let styles = match stylesheet.map(fs::read_to_string) {
        Some(Ok(styles)) => Cow::Owned(styles),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "failed to read stylesheet, using default styles");
            Cow::Borrowed(DEFAULT_STYLES)
        }
        None => Cow::Borrowed(DEFAULT_STYLES),
    };
    let styles_path = dir.join(STYLES_FILE);
    fs::write(&styles_path, styles.as_bytes())
        .with_context(|| format!("failed to write {}", styles_path.display()))?;

    let dashboard_path = dir.join(DASHBOARD_FILE);
    let html = render_dashboard(records, generated_at).context("failed to render dashboard")?;
    fs::write(&dashboard_path, html)
        .with_context(|| format!("failed to write {}", dashboard_path.display()))?;
    Ok(())
}

pub fn write_json(path: &Path, records: &[ProjectRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
