//! Rendering of resolved data as JSON, TOML, or YAML.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Json => "json",
            OutputFormat::Toml => "toml",
            OutputFormat::Yaml => "yaml",
        })
    }
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, AppError> {
    let render_error =
        |details: String| AppError::Render { what: format.to_string(), details };

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut out| {
                out.push('\n');
                out
            })
            .map_err(|e| render_error(e.to_string())),
        OutputFormat::Toml => toml::to_string_pretty(value).map_err(|e| render_error(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| render_error(e.to_string())),
    }
}
