use serde::Serialize;

use crate::app::AppContext;
use crate::domain::{AppError, ProfileOrigin, describe};
use crate::ports::{CommandRunner, ConfigSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub origin: ProfileOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// List declared profiles in `envlist` order, followed by unlisted sections.
///
/// Descriptions are substituted exactly as `show` would substitute them.
pub fn execute<S, R>(ctx: &AppContext<S, R>) -> Result<Vec<ProfileSummary>, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    let config = ctx.load_matrix()?;
    let options = ctx.resolve_options(&[]);

    let mut summaries = Vec::new();
    for name in config.names() {
        let origin = config.profile(&name)?.origin;
        let description = describe(&config, &name, &options)?;
        summaries.push(ProfileSummary { name, origin, description });
    }

    Ok(summaries)
}
