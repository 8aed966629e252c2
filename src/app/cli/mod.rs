//! CLI Adapter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::commands::check::CheckOptions;
use crate::app::commands::matrix::MatrixOptions;
use crate::app::commands::run::{RunOptions, RunStatus};
use crate::app::observability::init_tracing;
use crate::app::output::{OutputFormat, render};
use crate::app::settings::Settings;
use crate::domain::AppError;

#[derive(Parser)]
#[command(name = "envmatrix")]
#[command(version)]
#[command(
    about = "Load, validate, and run tox-style test-environment matrices",
    long_about = None
)]
struct Cli {
    /// Matrix configuration file (default: tox.ini)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared profiles
    #[clap(visible_alias = "l")]
    List {
        /// Show each profile's description
        #[arg(short, long)]
        describe: bool,
    },
    /// Print a resolved profile
    #[clap(visible_alias = "s")]
    Show {
        /// Profile name
        name: String,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Extra arguments substituted for {posargs}
        #[arg(last = true)]
        posargs: Vec<String>,
    },
    /// Print a profile's resolved command lines
    Commands {
        /// Profile name
        name: String,
        /// Extra arguments substituted for {posargs}
        #[arg(last = true)]
        posargs: Vec<String>,
    },
    /// Validate the matrix configuration
    #[clap(visible_alias = "c")]
    Check {
        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },
    /// Export profiles as a CI job matrix (JSON)
    Matrix {
        /// Keep only profiles whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Run the commands of one or more profiles (ALL selects every profile)
    #[clap(visible_alias = "r")]
    Run {
        /// Profile names, comma-separated or repeated
        #[arg(required = true, value_delimiter = ',')]
        profiles: Vec<String>,
        /// Print the commands without running them
        #[arg(long)]
        dry_run: bool,
        /// Extra arguments substituted for {posargs}
        #[arg(last = true)]
        posargs: Vec<String>,
    },
}

/// Entry point for the CLI.
pub fn run() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_settings(cli.config).and_then(|settings| dispatch(&settings, cli.command));

    match result {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings, AppError> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(path) = config {
        settings.config_file = if path.is_relative() { cwd.join(path) } else { path };
    }
    Ok(settings)
}

fn dispatch(settings: &Settings, command: Commands) -> Result<i32, AppError> {
    match command {
        Commands::List { describe } => run_list(settings, describe).map(|_| 0),
        Commands::Show { name, format, posargs } => {
            let format = format.unwrap_or(settings.default_format);
            let profile = crate::show(settings, &name, &posargs)?;
            print!("{}", render(&profile, format)?);
            Ok(0)
        }
        Commands::Commands { name, posargs } => {
            for command in crate::commands(settings, &name, &posargs)? {
                println!("{}", command.line);
            }
            Ok(0)
        }
        Commands::Check { strict } => {
            crate::check(settings, CheckOptions { strict }).map(|outcome| outcome.exit_code)
        }
        Commands::Matrix { filter } => {
            let matrix = crate::matrix(settings, MatrixOptions { filter })?;
            println!(
                "{}",
                serde_json::to_string(&matrix).map_err(|e| AppError::Render {
                    what: "matrix".into(),
                    details: e.to_string(),
                })?
            );
            Ok(0)
        }
        Commands::Run { profiles, dry_run, posargs } => {
            run_profiles(settings, profiles, dry_run, posargs)
        }
    }
}

fn run_list(settings: &Settings, describe: bool) -> Result<(), AppError> {
    let summaries = crate::list(settings)?;
    let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for summary in summaries {
        match (&summary.description, describe) {
            (Some(description), true) if !description.is_empty() => {
                println!("{:<width$} -> {}", summary.name, description, width = width);
            }
            _ => println!("{}", summary.name),
        }
    }
    Ok(())
}

fn run_profiles(
    settings: &Settings,
    profiles: Vec<String>,
    dry_run: bool,
    posargs: Vec<String>,
) -> Result<i32, AppError> {
    let result = crate::run(settings, RunOptions { profiles, posargs, dry_run })?;

    for profile in &result.profiles {
        for command in &profile.commands {
            if let Some(error) = &command.error {
                eprintln!("{}: {}", profile.name, error);
            }
        }
        match &profile.status {
            RunStatus::DryRun => {
                println!("{}:", profile.name);
                for command in &profile.commands {
                    println!("  {}", command.line);
                }
            }
            RunStatus::Succeeded => println!("✅ {}: commands succeeded", profile.name),
            RunStatus::Failed { command, code } => {
                println!("❌ {}: '{}' failed with exit code {}", profile.name, command, code);
            }
        }
    }

    Ok(if result.failed().next().is_some() { 1 } else { 0 })
}
