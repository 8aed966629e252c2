//! envmatrix: load, validate, and run tox-style test-environment matrices.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

use adapters::{FilesystemConfigSource, ProcessCommandRunner};
use app::AppContext;
use app::commands::{check, list, matrix, run, show};

pub use app::commands::check::{CheckOptions, CheckOutcome};
pub use app::commands::list::ProfileSummary;
pub use app::commands::matrix::{CiMatrix, CiMatrixEntry, MatrixOptions};
pub use app::commands::run::{RunOptions, RunResult, RunStatus};
pub use app::output::OutputFormat;
pub use app::settings::Settings;
pub use domain::{AppError, ResolvedCommand, ResolvedProfile};

fn context(settings: &Settings) -> AppContext<FilesystemConfigSource, ProcessCommandRunner> {
    AppContext::new(FilesystemConfigSource::new(&settings.config_file), ProcessCommandRunner)
        .with_process_env(settings.process_env())
}

/// List declared profiles.
pub fn list(settings: &Settings) -> Result<Vec<ProfileSummary>, AppError> {
    list::execute(&context(settings))
}

/// Resolve a profile into its working directory, variables, dependencies, and commands.
pub fn show(
    settings: &Settings,
    name: &str,
    posargs: &[String],
) -> Result<ResolvedProfile, AppError> {
    show::execute(&context(settings), name, posargs)
}

/// Resolve a profile and return only its command lines.
pub fn commands(
    settings: &Settings,
    name: &str,
    posargs: &[String],
) -> Result<Vec<ResolvedCommand>, AppError> {
    show::command_lines(&context(settings), name, posargs)
}

/// Validate the matrix configuration.
pub fn check(settings: &Settings, options: CheckOptions) -> Result<CheckOutcome, AppError> {
    check::execute(&context(settings), options)
}

/// Export profiles as a CI job matrix.
pub fn matrix(settings: &Settings, options: MatrixOptions) -> Result<CiMatrix, AppError> {
    matrix::export(&context(settings), options)
}

/// Run the commands of one or more profiles.
///
/// Dependencies are not installed; commands run in the current environment
/// with the profile's `setenv` applied.
pub fn run(settings: &Settings, options: RunOptions) -> Result<RunResult, AppError> {
    run::execute(&context(settings), options)
}
