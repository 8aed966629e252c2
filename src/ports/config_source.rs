//! Source of matrix configuration text.

use std::path::PathBuf;

use crate::domain::AppError;

/// Raw configuration text together with the project root it belongs to.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Directory substituted for `{toxinidir}`.
    pub root: PathBuf,
    /// Human-readable origin used in diagnostics.
    pub origin: String,
    pub text: String,
}

/// Port for reading the matrix configuration.
pub trait ConfigSource {
    fn load(&self) -> Result<LoadedConfig, AppError>;
}
