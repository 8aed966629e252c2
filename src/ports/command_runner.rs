//! Process execution seam for resolved commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::{AppError, ResolvedCommand};

/// Execution environment for one profile's commands.
#[derive(Debug, Clone, Default)]
pub struct RunEnv {
    pub working_dir: PathBuf,
    /// Variables set on top of the inherited environment.
    pub vars: BTreeMap<String, String>,
}

/// Port for running a resolved command.
///
/// Implementations return the exit code; spawning failures are errors.
pub trait CommandRunner {
    fn run(&self, command: &ResolvedCommand, env: &RunEnv) -> Result<i32, AppError>;
}
