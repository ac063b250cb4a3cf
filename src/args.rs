use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "project-dashboard")]
#[clap(author, version, about)]
#[clap(subcommand_precedence_over_arg = true)]
pub struct Args {
    /// Project directories to report on. Overrides the environment and the
    /// config file when given.
    pub projects: Vec<PathBuf>,
    /// Path to the TOML config file. Defaults to ./dashboard.toml if present.
    #[clap(short, long, global = true, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,
    /// Directory the dashboard is written into.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
    /// Also dump the project records as JSON into this file.
    #[clap(long)]
    pub json: Option<PathBuf>,
    /// Suppress any progress output if set.
    #[clap(short, long, global = true)]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create acceptance checklists for projects which don't have one yet.
    InitChecklists {
        /// Actually create the files instead of a dry run.
        #[clap(long)]
        write: bool,
        /// Checklist template to use instead of the built-in one.
        #[clap(long)]
        template: Option<PathBuf>,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
