use crate::app::AppContext;
use crate::domain::{AppError, ResolvedCommand, ResolvedProfile, resolve};
use crate::ports::{CommandRunner, ConfigSource};

/// Resolve one profile.
pub fn execute<S, R>(
    ctx: &AppContext<S, R>,
    name: &str,
    posargs: &[String],
) -> Result<ResolvedProfile, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    let config = ctx.load_matrix()?;
    resolve(&config, name, &ctx.resolve_options(posargs))
}

/// Resolve one profile and return only its command lines.
pub fn command_lines<S, R>(
    ctx: &AppContext<S, R>,
    name: &str,
    posargs: &[String],
) -> Result<Vec<ResolvedCommand>, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    execute(ctx, name, posargs).map(|profile| profile.commands)
}
