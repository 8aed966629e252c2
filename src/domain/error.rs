use std::io;

use thiserror::Error;

/// Library-wide error type for envmatrix operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Matrix configuration file not found.
    #[error("Matrix config not found: {0}")]
    ConfigNotFound(String),

    /// Malformed matrix configuration text.
    #[error("Parse error at line {line}: {details}")]
    Parse { line: usize, details: String },

    /// Two sections declare the same profile.
    #[error("Duplicate profile '{name}' at line {line}")]
    DuplicateProfile { name: String, line: usize },

    /// Requested profile is not declared.
    #[error("Profile '{name}' not found. Available: {available}")]
    ProfileNotFound { name: String, available: String },

    /// Placeholder token outside the known set.
    #[error("Unknown placeholder '{{{token}}}'")]
    UnknownPlaceholder { token: String },

    /// `{[section]key}` reference that points nowhere.
    #[error("Reference to missing key '{key}' in section '[{section}]'")]
    MissingReference { section: String, key: String },

    /// Tool settings (envmatrix.toml) error.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// Serialization error while rendering output.
    #[error("Failed to render {what}: {details}")]
    Render { what: String, details: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn parse_error<S: Into<String>>(line: usize, details: S) -> Self {
        AppError::Parse { line, details: details.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_not_found_lists_available() {
        let err = AppError::ProfileNotFound { name: "py39".into(), available: "py37, py38".into() };
        assert_eq!(err.to_string(), "Profile 'py39' not found. Available: py37, py38");
    }

    #[test]
    fn unknown_placeholder_is_rendered_with_braces() {
        let err = AppError::UnknownPlaceholder { token: "envtmpdir".into() };
        assert_eq!(err.to_string(), "Unknown placeholder '{envtmpdir}'");
    }
}
