//! Tool settings (`envmatrix.toml`).
//!
//! Precedence: command-line flag > `ENVMATRIX_CONFIG` > settings file > default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::app::output::OutputFormat;
use crate::domain::AppError;

pub const SETTINGS_FILE: &str = "envmatrix.toml";
pub const DEFAULT_CONFIG_FILE: &str = "tox.ini";
pub const CONFIG_ENV_VAR: &str = "ENVMATRIX_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Matrix configuration file, relative to the settings directory.
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,
    /// Format used by `show` when none is given.
    #[serde(default)]
    pub default_format: OutputFormat,
    /// Extra variables visible to `{env:NAME}` lookups, overriding the process environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_config_file() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            default_format: OutputFormat::default(),
            env: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Parse settings content.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| AppError::Settings(e.to_string()))?;
        if settings.config_file.as_os_str().is_empty() {
            return Err(AppError::Settings("config_file must not be empty".into()));
        }
        Ok(settings)
    }

    /// Load settings from `dir`, then apply environment overrides.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        Self::load_with(dir, |key| std::env::var(key).ok())
    }

    pub fn load_with(
        dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let path = dir.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            Self::parse(&std::fs::read_to_string(&path)?)?
        } else {
            Self::default()
        };

        if let Some(config) = lookup(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            settings.config_file = PathBuf::from(config);
        }
        if settings.config_file.is_relative() {
            settings.config_file = dir.join(&settings.config_file);
        }
        Ok(settings)
    }

    /// Process environment with the settings overlay applied.
    pub fn process_env(&self) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = std::env::vars().collect();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_with(dir.path(), |_| None).unwrap();

        assert_eq!(settings.config_file, dir.path().join("tox.ini"));
        assert_eq!(settings.default_format, OutputFormat::Json);
        assert!(settings.env.is_empty());
    }

    #[test]
    fn reads_settings_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "config_file = \"ci/tox.ini\"\ndefault_format = \"yaml\"\n[env]\nCI = \"true\"\n",
        )
        .unwrap();

        let settings = Settings::load_with(dir.path(), |_| None).unwrap();
        assert_eq!(settings.config_file, dir.path().join("ci/tox.ini"));
        assert_eq!(settings.default_format, OutputFormat::Yaml);
        assert_eq!(settings.env.get("CI").map(String::as_str), Some("true"));
    }

    #[test]
    fn env_var_overrides_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "config_file = \"a.ini\"\n").unwrap();

        let settings = Settings::load_with(dir.path(), |key| {
            (key == CONFIG_ENV_VAR).then(|| "/abs/b.ini".to_string())
        })
        .unwrap();
        assert_eq!(settings.config_file, PathBuf::from("/abs/b.ini"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Settings::parse("config = \"tox.ini\"\n").unwrap_err();
        assert!(matches!(err, AppError::Settings(_)));
    }

    #[test]
    #[serial]
    fn overlay_wins_over_process_env() {
        unsafe {
            std::env::set_var("ENVMATRIX_TEST_OVERLAY", "process");
        }
        let mut settings = Settings::default();
        settings.env.insert("ENVMATRIX_TEST_OVERLAY".into(), "settings".into());

        let env = settings.process_env();
        assert_eq!(env.get("ENVMATRIX_TEST_OVERLAY").map(String::as_str), Some("settings"));

        unsafe {
            std::env::remove_var("ENVMATRIX_TEST_OVERLAY");
        }
    }
}
