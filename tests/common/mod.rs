//! Shared testing utilities for envmatrix CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Matrix configuration used across the integration tests.
pub const SAMPLE_CONFIG: &str = include_str!("../fixtures/tox.ini");

/// Isolated project directory for CLI and library exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create an empty project directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("project");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, work_dir }
    }

    /// Create a project directory holding the sample `tox.ini`.
    pub fn with_sample_config() -> Self {
        let ctx = Self::new();
        ctx.write_config(SAMPLE_CONFIG);
        ctx
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Project directory as substituted for `{toxinidir}`.
    pub fn canonical_work_dir(&self) -> PathBuf {
        self.work_dir.canonicalize().expect("Failed to canonicalize work directory")
    }

    pub fn write_config(&self, content: &str) {
        self.write_file("tox.ini", content);
    }

    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.work_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(path, content).expect("Failed to write test file");
    }

    /// Command for the compiled `envmatrix` binary, run from the project directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("envmatrix").expect("Failed to locate envmatrix binary");
        cmd.current_dir(&self.work_dir)
            .env_remove("ENVMATRIX_CONFIG")
            .env_remove("ENVMATRIX_LOG")
            .env_remove("ENVMATRIX_LOG_JSON")
            .env_remove("RUST_LOG");
        cmd
    }
}
