mod args;
mod bootstrap;
mod checklist;
mod config;
mod process;
mod progress;
mod project;
mod render;
mod scan;
mod status;
mod testrun;
mod utils;
mod vcs;

use anyhow::{Context, Result};
use args::{Args, Command};
use chrono::Local;
use config::Config;
use progress::{AcceptanceTests, Checklist, ProgressTier};
use project::Signals;
use std::fs;
use std::io;
use testrun::CommandRunner;
use tracing_subscriber::EnvFilter;
use vcs::GitCli;

fn main() -> Result<()> {
    let args = Args::parse_args();
    init_logging(args.quiet);
    do_main(&args)
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn do_main(args: &Args) -> Result<()> {
    tracing::info!("Resolving projects...");
    let config = Config::resolve(args)?;

    let template = match &args.command {
        Some(Command::InitChecklists {
            template: Some(path),
            ..
        }) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read template {}", path.display()))?,
        ),
        Some(Command::InitChecklists { template: None, .. }) => {
            Some(bootstrap::DEFAULT_TEMPLATE.to_string())
        }
        None => None,
    };

    let git = GitCli {
        timeout: config.signals.git_timeout,
    };
    let tests = CommandRunner {
        command: config.signals.test_command.clone(),
        timeout: config.signals.test_timeout,
    };
    let tiers: [&dyn ProgressTier; 2] = [&AcceptanceTests { source: &tests }, &Checklist];
    // Bootstrapping checklists has no use for progress, skip running tests.
    let tiers: &[&dyn ProgressTier] = if template.is_some() { &[] } else { &tiers };
    let now = Local::now();
    let signals = Signals {
        commits: &git,
        progress: tiers,
        today: now.date_naive(),
    };

    tracing::info!(count = config.projects.len(), "Scanning projects...");
    let records = project::collect_projects(&config.projects, &signals, args.quiet);

    if let (Some(template), Some(Command::InitChecklists { write, .. })) =
        (template, &args.command)
    {
        let created = bootstrap::init_checklists(&records, &template, *write);
        if *write {
            println!("\nCreated {} checklists.", created);
        } else {
            println!("\n(Dry run) Would have created {} checklists.", created);
        }
        return Ok(());
    }

    tracing::info!("Writing dashboard...");
    render::write_report(
        &config.output_dir,
        &records,
        now,
        config.stylesheet.as_deref(),
    )?;
    if let Some(json) = &args.json {
        render::write_json(json, &records)?;
    }
    tracing::info!(
        path = %config.output_dir.join(render::DASHBOARD_FILE).display(),
        projects = records.len(),
        "Dashboard generated"
    );
    Ok(())
}
