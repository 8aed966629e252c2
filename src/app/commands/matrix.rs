use serde::Serialize;

use crate::app::AppContext;
use crate::domain::{AppError, resolve};
use crate::ports::{CommandRunner, ConfigSource};

#[derive(Debug, Clone, Default)]
pub struct MatrixOptions {
    /// Keep only profiles whose name contains this text.
    pub filter: Option<String>,
}

/// CI job matrix (`{"include": [...]}`), one entry per profile.
#[derive(Debug, Serialize)]
pub struct CiMatrix {
    pub include: Vec<CiMatrixEntry>,
}

#[derive(Debug, Serialize)]
pub struct CiMatrixEntry {
    pub env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepython: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub fn export<S, R>(ctx: &AppContext<S, R>, options: MatrixOptions) -> Result<CiMatrix, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    let config = ctx.load_matrix()?;
    let resolve_options = ctx.resolve_options(&[]);

    let mut include = Vec::new();
    for name in config.names() {
        if let Some(filter) = &options.filter
            && !name.contains(filter.as_str())
        {
            continue;
        }
        let resolved = resolve(&config, &name, &resolve_options)?;
        include.push(CiMatrixEntry {
            env: name,
            basepython: resolved.basepython,
            description: resolved.description,
        });
    }

    Ok(CiMatrix { include })
}
