use std::process::Command;

use tracing::info;

use crate::domain::{AppError, ResolvedCommand};
use crate::ports::{CommandRunner, RunEnv};

/// Spawns each command directly (no shell) and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, command: &ResolvedCommand, env: &RunEnv) -> Result<i32, AppError> {
        let Some((program, args)) = command.argv.split_first() else {
            return Ok(0);
        };

        info!(command = %command.line, cwd = %env.working_dir.display(), "running");
        let status = Command::new(program)
            .args(args)
            .current_dir(&env.working_dir)
            .envs(&env.vars)
            .status()
            .map_err(|e| AppError::config_error(format!("Failed to start '{}': {}", program, e)))?;

        // Terminated by a signal.
        Ok(status.code().unwrap_or(-1))
    }
}
