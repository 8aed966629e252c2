//! In-crate fakes for the configuration and process-runner ports.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::{AppError, ResolvedCommand};
use crate::ports::{CommandRunner, ConfigSource, LoadedConfig, RunEnv};

/// Realistic matrix configuration shared by unit and integration tests.
pub const SAMPLE_CONFIG: &str = include_str!("../../tests/fixtures/tox.ini");

pub struct InMemoryConfigSource {
    text: String,
}

impl InMemoryConfigSource {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }

    pub fn root() -> PathBuf {
        PathBuf::from("/work/sunpy")
    }
}

impl ConfigSource for InMemoryConfigSource {
    fn load(&self) -> Result<LoadedConfig, AppError> {
        Ok(LoadedConfig { root: Self::root(), origin: "tox.ini".into(), text: self.text.clone() })
    }
}

/// Records every command instead of spawning it.
#[derive(Default)]
pub struct FakeRunner {
    pub executed: Mutex<Vec<(String, RunEnv)>>,
    exit_codes: HashMap<String, i32>,
    unspawnable: HashSet<String>,
}

impl FakeRunner {
    /// Make the command whose program is `program` exit with `code`.
    pub fn with_exit_code(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    /// Make the command whose program is `program` fail to start.
    pub fn with_spawn_error(mut self, program: &str) -> Self {
        self.unspawnable.insert(program.to_string());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.executed.lock().unwrap().iter().map(|(line, _)| line.clone()).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &ResolvedCommand, env: &RunEnv) -> Result<i32, AppError> {
        self.executed.lock().unwrap().push((command.line.clone(), env.clone()));
        let program = command.argv.first().map(String::as_str).unwrap_or_default();
        if self.unspawnable.contains(program) {
            return Err(AppError::config_error(format!(
                "Failed to start '{}': No such file or directory",
                program
            )));
        }
        Ok(self.exit_codes.get(program).copied().unwrap_or(0))
    }
}
