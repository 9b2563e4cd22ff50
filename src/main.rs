//! update-conf CLI
//!
//! Entry point for the `update-conf` command-line tool.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use update_conf::logging::init_logging;
use update_conf::prelude::*;
use update_conf::settings::{EnvOverrides, InstallOutcome, Profile, Settings, install_sample};

/// Settings file consulted when `-n` is given without `-c`.
const DEFAULT_SETTINGS_PATH: &str = "/etc/update-conf.conf";

/// Exit status of `--check` when the target is out of date.
const EXIT_CHANGES_PENDING: u8 = 2;

#[derive(Parser)]
#[command(name = "update-conf")]
#[command(about = "Merge a base config file and its snippets into a live config file", version)]
struct Cli {
    #[command(flatten)]
    args: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct RunArgs {
    /// Settings file holding named profiles (default: /etc/update-conf.conf)
    #[arg(short = 'c', long = "config", requires = "name")]
    config: Option<PathBuf>,

    /// Profile to use from the settings file
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Base configuration file
    #[arg(short = 'b', long)]
    base: Option<PathBuf>,

    /// Snippet directory (default: <target>.d)
    #[arg(short = 'd', long = "snippets")]
    snippets: Option<PathBuf>,

    /// Live configuration file to maintain
    #[arg(short = 't', long)]
    target: Option<PathBuf>,

    /// Filename suffix marking a snippet (default: .conf)
    #[arg(long)]
    suffix: Option<String>,

    /// Suffix appended to the target name for its backup (default: .bak)
    #[arg(long)]
    backup_suffix: Option<String>,

    /// Print the changes that would be made without writing anything
    #[arg(long, conflicts_with = "check")]
    dry_run: bool,

    /// Like --dry-run, but exit with status 2 if the target is out of date
    #[arg(long)]
    check: bool,

    /// Lines of context around each change in the printed diff
    #[arg(long, value_name = "LINES", default_value_t = 3)]
    context: usize,

    /// Print which source set each key
    #[arg(long)]
    explain: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the sample settings file if none exists
    InitSettings {
        /// Destination (default: /etc/update-conf.conf)
        path: Option<PathBuf>,
    },

    /// Put the backup of the target back in place
    Restore,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Some(Commands::InitSettings { path }) => run_init_settings(path.clone()),
        Some(Commands::Restore) => run_restore(&cli.args),
        None => run_update(&cli.args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("update-conf: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run_update(args: &RunArgs) -> Result<ExitCode> {
    let mode = if args.dry_run || args.check {
        WriteMode::DryRun
    } else {
        WriteMode::Apply
    };
    let report = build_updater(args, mode)?.run()?;

    if args.json {
        if let Err(e) = print_json(&report) {
            eprintln!("update-conf: cannot encode report: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    } else {
        if args.explain {
            for entry in &report.provenance {
                println!(
                    "{}.{} <- {}",
                    entry.section,
                    entry.key,
                    entry.source.path().display()
                );
            }
        }
        if let Some(diff) = report.diff() {
            print!("{}", diff.with_context(args.context));
        }
    }

    if args.check && report.outcome.is_change() {
        return Ok(ExitCode::from(EXIT_CHANGES_PENDING));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_restore(args: &RunArgs) -> Result<ExitCode> {
    let updater = build_updater(args, WriteMode::Apply)?;
    updater.restore()?;
    println!(
        "restored {} from {}",
        updater.target().display(),
        updater.backup_path().display()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_init_settings(path: Option<PathBuf>) -> Result<ExitCode> {
    let dest = path.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    match install_sample(&dest)? {
        InstallOutcome::Installed => println!("installed sample settings at {}", dest.display()),
        InstallOutcome::AlreadyPresent => {
            println!("{} already exists, left unchanged", dest.display())
        }
        InstallOutcome::NotWritable => {
            eprintln!("update-conf: cannot write {}, skipped", dest.display())
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Resolve settings profile, environment, and flags into an updater.
///
/// Flags override the profile, which is read only when `-n` is given.
fn build_updater(args: &RunArgs, mode: WriteMode) -> Result<Updater> {
    let from_settings = match &args.name {
        Some(name) => {
            let (path, required) = match &args.config {
                Some(path) => (path.clone(), true),
                None => (PathBuf::from(DEFAULT_SETTINGS_PATH), false),
            };
            Settings::load(&path, required, EnvOverrides::default())?
                .profile(name)?
                .clone()
        }
        None => Profile::default(),
    };

    let from_flags = Profile {
        base: args.base.clone(),
        target: args.target.clone(),
        snippets: args.snippets.clone(),
        suffix: args.suffix.clone(),
        backup_suffix: args.backup_suffix.clone(),
    };

    from_settings
        .overlay(from_flags)
        .resolve()?
        .builder()
        .with_mode(mode)
        .build()
}

fn print_json(report: &RunReport) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
