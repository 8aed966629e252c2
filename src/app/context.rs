use std::collections::BTreeMap;

use crate::domain::{AppError, MatrixConfig, ResolveOptions};
use crate::ports::{CommandRunner, ConfigSource, LoadedConfig};

/// Application context holding the configuration source and process runner.
pub struct AppContext<S, R>
where
    S: ConfigSource,
    R: CommandRunner,
{
    source: S,
    runner: R,
    process_env: BTreeMap<String, String>,
}

impl<S, R> AppContext<S, R>
where
    S: ConfigSource,
    R: CommandRunner,
{
    pub fn new(source: S, runner: R) -> Self {
        Self { source, runner, process_env: BTreeMap::new() }
    }

    /// Environment consulted by `{env:NAME}` lookups.
    pub fn with_process_env(mut self, process_env: BTreeMap<String, String>) -> Self {
        self.process_env = process_env;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn load_source(&self) -> Result<LoadedConfig, AppError> {
        self.source.load()
    }

    pub fn load_matrix(&self) -> Result<MatrixConfig, AppError> {
        let loaded = self.source.load()?;
        MatrixConfig::parse(&loaded.text, &loaded.root)
    }

    pub fn resolve_options(&self, posargs: &[String]) -> ResolveOptions {
        ResolveOptions { posargs: posargs.to_vec(), process_env: self.process_env.clone() }
    }
}
