use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::domain::{AppError, ResolvedProfile, resolve};
use crate::ports::{CommandRunner, ConfigSource, RunEnv};

/// Profile name selecting every declared profile.
pub const ALL_PROFILES: &str = "ALL";

/// Exit code recorded for a command whose program could not be started.
pub const SPAWN_FAILURE_CODE: i32 = 127;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub profiles: Vec<String>,
    pub posargs: Vec<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed { command: String, code: i32 },
    DryRun,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Why the program could not be started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileRun {
    pub name: String,
    pub commands: Vec<CommandOutcome>,
    #[serde(flatten)]
    pub status: RunStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub profiles: Vec<ProfileRun>,
}

impl RunResult {
    pub fn failed(&self) -> impl Iterator<Item = &ProfileRun> {
        self.profiles.iter().filter(|run| matches!(run.status, RunStatus::Failed { .. }))
    }
}

/// Resolve the requested profiles, then run their commands in order.
///
/// Every profile is resolved before anything runs, so a configuration error
/// aborts the whole invocation. Within a profile, the first failing command
/// stops that profile unless it was marked with a leading `-`; later
/// profiles still run. A program that cannot be started counts as a failure
/// with exit code 127.
pub fn execute<S, R>(ctx: &AppContext<S, R>, options: RunOptions) -> Result<RunResult, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    if options.profiles.is_empty() {
        return Err(AppError::config_error("No profiles given to run"));
    }

    let config = ctx.load_matrix()?;
    let names = if options.profiles.iter().any(|name| name == ALL_PROFILES) {
        config.names()
    } else {
        options.profiles.clone()
    };

    let resolve_options = ctx.resolve_options(&options.posargs);
    let resolved = names
        .iter()
        .map(|name| resolve(&config, name, &resolve_options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut profiles = Vec::with_capacity(resolved.len());
    for profile in resolved {
        let run = if options.dry_run {
            dry_run(&profile)
        } else {
            run_profile(ctx.runner(), &profile)?
        };
        profiles.push(run);
    }

    Ok(RunResult { profiles })
}

fn dry_run(profile: &ResolvedProfile) -> ProfileRun {
    ProfileRun {
        name: profile.name.clone(),
        commands: profile
            .commands
            .iter()
            .map(|command| CommandOutcome {
                line: command.line.clone(),
                exit_code: None,
                error: None,
            })
            .collect(),
        status: RunStatus::DryRun,
    }
}

fn run_profile<R: CommandRunner>(runner: &R, profile: &ResolvedProfile) -> Result<ProfileRun, AppError> {
    info!(profile = %profile.name, dir = %profile.working_dir.display(), "starting profile");
    std::fs::create_dir_all(&profile.working_dir)?;

    let env = RunEnv { working_dir: profile.working_dir.clone(), vars: profile.setenv.clone() };
    let mut commands = Vec::new();
    let mut status = RunStatus::Succeeded;

    for command in &profile.commands {
        let (code, error) = match runner.run(command, &env) {
            Ok(code) => (code, None),
            Err(err) => {
                warn!(
                    profile = %profile.name,
                    command = %command.line,
                    error = %err,
                    "command did not start"
                );
                (SPAWN_FAILURE_CODE, Some(err.to_string()))
            }
        };
        commands.push(CommandOutcome { line: command.line.clone(), exit_code: Some(code), error });
        if code == 0 {
            continue;
        }
        if command.ignore_errors {
            warn!(profile = %profile.name, command = %command.line, code, "ignoring failed command");
            continue;
        }
        warn!(profile = %profile.name, command = %command.line, code, "command failed");
        status = RunStatus::Failed { command: command.line.clone(), code };
        break;
    }

    Ok(ProfileRun { name: profile.name.clone(), commands, status })
}
