//! Resolution of the dashboard configuration.
//!
//! Project roots are taken from the first source which provides any, in
//! this order:
//!
//! 1. positional paths on the command line,
//! 2. the `DASHBOARD_PROJECTS` environment variable (a platform path list),
//! 3. the `[projects]` table of the TOML config file.
//!
//! Everything else comes from the config file or falls back to defaults.

use crate::args::Args;
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding a list of project roots.
pub const PROJECTS_ENV: &str = "DASHBOARD_PROJECTS";

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

const DEFAULT_OUTPUT_DIR: &str = "dist";
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TEST_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    output_dir: Option<PathBuf>,
    stylesheet: Option<PathBuf>,
    projects: FileProjects,
    signals: FileSignals,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileProjects {
    roots: Vec<PathBuf>,
    parents: Vec<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSignals {
    git_timeout_secs: Option<u64>,
    test_timeout_secs: Option<u64>,
    test_command: Option<Vec<String>>,
}

/// Knobs for the external tools the project signals are read from.
#[derive(Debug, Clone)]
pub struct SignalSettings {
    pub git_timeout: Duration,
    pub test_timeout: Duration,
    /// Program and leading arguments; the acceptance test path is appended.
    pub test_command: Vec<String>,
}

impl Default for SignalSettings {
    fn default() -> Self {
        SignalSettings {
            git_timeout: Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS),
            test_timeout: Duration::from_secs(DEFAULT_TEST_TIMEOUT_SECS),
            test_command: ["python3", "-m", "pytest", "-q"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub projects: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub stylesheet: Option<PathBuf>,
    pub signals: SignalSettings,
}

impl Config {
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        resolve_with(
            args,
            env::var_os(PROJECTS_ENV),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }
}

fn resolve_with(
    args: &Args,
    env_projects: Option<OsString>,
    default_config: &Path,
) -> Result<Config, ConfigError> {
    let file = match &args.config {
        Some(path) => load_file(path)?,
        None if default_config.is_file() => load_file(default_config)?,
        None => FileConfig::default(),
    };

    let projects = if !args.projects.is_empty() {
        args.projects.iter().map(|p| expand_home(p)).collect()
    } else if let Some(list) = env_projects.filter(|v| !v.is_empty()) {
        env::split_paths(&list).map(|p| expand_home(&p)).collect()
    } else {
        let mut projects: Vec<PathBuf> =
            file.projects.roots.iter().map(|p| expand_home(p)).collect();
        for parent in &file.projects.parents {
            projects.extend(list_children(&expand_home(parent)));
        }
        projects
    };

    let mut signals = SignalSettings::default();
    if let Some(secs) = file.signals.git_timeout_secs {
        signals.git_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.signals.test_timeout_secs {
        signals.test_timeout = Duration::from_secs(secs);
    }
    if let Some(command) = file.signals.test_command {
        if command.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "signals.test_command",
                message: "must name a program".to_string(),
            });
        }
        signals.test_command = command;
    }

    let output_dir = args
        .output
        .clone()
        .or_else(|| file.output_dir.as_deref().map(expand_home))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    Ok(Config {
        projects,
        output_dir,
        stylesheet: file.stylesheet.as_deref().map(expand_home),
        signals,
    })
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Every non-hidden sub-directory of `parent`, sorted by name. A parent
/// which cannot be listed contributes nothing.
fn list_children(parent: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::info!(path = %parent.display(), error = %err, "skipping project parent");
            return vec![];
        }
    };
    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();
    children
}
