use std::path::PathBuf;

use tracing::debug;

use crate::domain::AppError;
use crate::ports::{ConfigSource, LoadedConfig};

/// Reads the matrix configuration from a file; its directory is the project root.
#[derive(Debug, Clone)]
pub struct FilesystemConfigSource {
    path: PathBuf,
}

impl FilesystemConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FilesystemConfigSource {
    fn load(&self) -> Result<LoadedConfig, AppError> {
        if !self.path.is_file() {
            return Err(AppError::ConfigNotFound(self.path.display().to_string()));
        }

        let text = std::fs::read_to_string(&self.path)?;
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        let root = parent.canonicalize()?;
        debug!(path = %self.path.display(), root = %root.display(), "read matrix configuration");

        Ok(LoadedConfig { root, origin: self.path.display().to_string(), text })
    }
}
