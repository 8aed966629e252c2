//! Profile resolution: inheritance, condition filtering, and substitution.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::AppError;
use crate::domain::command_line;
use crate::domain::condition::Conditional;
use crate::domain::matrix::MatrixConfig;
use crate::domain::placeholder::{SubstitutionContext, substitute};
use crate::domain::profile::{EnvProfile, ResolvedCommand, ResolvedProfile};

/// Invocation-time inputs for resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Extra positional arguments substituted for `{posargs}`.
    pub posargs: Vec<String>,
    /// Process environment consulted by `{env:NAME}` after `setenv`.
    pub process_env: BTreeMap<String, String>,
}

/// Resolve the profile `name` into a concrete run plan.
pub fn resolve(
    config: &MatrixConfig,
    name: &str,
    options: &ResolveOptions,
) -> Result<ResolvedProfile, AppError> {
    let profile = config.profile(name)?.inherit(&config.base);
    let setenv = resolve_setenv(config, &profile, name, options)?;

    let ctx = context(config, name, options, &setenv);
    let subst = |text: &str| -> Result<String, AppError> {
        substitute(text, &ctx).map(|s| s.trim().to_string())
    };
    let subst_all = |lines: &Option<Vec<Conditional<String>>>| -> Result<Vec<String>, AppError> {
        let mut out = Vec::new();
        for line in applicable(lines, name) {
            let value = subst(line)?;
            if !value.is_empty() {
                out.push(value);
            }
        }
        Ok(out)
    };

    let working_dir = match &profile.changedir {
        Some(dir) => {
            let dir = PathBuf::from(subst(dir)?);
            if dir.is_absolute() { dir } else { config.root.join(dir) }
        }
        None => config.root.clone(),
    };

    let mut commands = Vec::new();
    for line in subst_all(&profile.commands)? {
        let (line, ignore_errors) = match line.strip_prefix('-') {
            Some(rest) => (rest.trim_start().to_string(), true),
            None => (line, false),
        };
        let argv = command_line::split(&line)?;
        if argv.is_empty() {
            continue;
        }
        commands.push(ResolvedCommand { line, argv, ignore_errors });
    }

    let description = profile.description.as_deref().map(subst).transpose()?;
    let basepython = match profile.basepython.as_deref() {
        Some(raw) => Some(subst(raw)?),
        None => default_basepython(name),
    };
    let deps = subst_all(&profile.deps)?;
    let extras: BTreeSet<String> = subst_all(&profile.extras)?.into_iter().collect();
    let passenv = subst_all(&profile.passenv)?;
    let allowlist_externals = subst_all(&profile.allowlist_externals)?;
    let conda_deps = subst_all(&profile.conda_deps)?;
    let conda_channels = subst_all(&profile.conda_channels)?;

    let resolved = ResolvedProfile {
        name: name.to_string(),
        description,
        basepython,
        working_dir,
        setenv,
        deps,
        extras,
        commands,
        passenv,
        allowlist_externals,
        conda_deps,
        conda_channels,
        skip_install: profile.skip_install.unwrap_or(false),
    };

    debug!(
        profile = name,
        commands = resolved.commands.len(),
        deps = resolved.deps.len(),
        "resolved profile"
    );
    Ok(resolved)
}

/// Resolve only the description of `name`, with the same `setenv` and
/// environment that `resolve` sees.
pub fn describe(
    config: &MatrixConfig,
    name: &str,
    options: &ResolveOptions,
) -> Result<Option<String>, AppError> {
    let profile = config.profile(name)?.inherit(&config.base);
    let Some(raw) = profile.description.as_deref() else {
        return Ok(None);
    };
    let setenv = resolve_setenv(config, &profile, name, options)?;
    let ctx = context(config, name, options, &setenv);
    Ok(Some(substitute(raw, &ctx)?.trim().to_string()))
}

/// Evaluate `setenv` in declaration order; each value sees the ones before it.
fn resolve_setenv(
    config: &MatrixConfig,
    profile: &EnvProfile,
    name: &str,
    options: &ResolveOptions,
) -> Result<BTreeMap<String, String>, AppError> {
    let mut setenv = BTreeMap::new();
    for line in applicable(&profile.setenv, name) {
        let (key, raw) = line.split_once('=').ok_or_else(|| {
            AppError::config_error(format!(
                "setenv entry '{}' in profile '{}' must be KEY = VALUE",
                line, name
            ))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::config_error(format!(
                "setenv entry '{}' in profile '{}' has an empty name",
                line, name
            )));
        }
        let value = {
            let ctx = context(config, name, options, &setenv);
            substitute(raw.trim(), &ctx)?
        };
        setenv.insert(key.to_string(), value);
    }
    Ok(setenv)
}

/// Interpreter implied by a `pyXY` factor (`py38` -> `python3.8`).
pub fn default_basepython(name: &str) -> Option<String> {
    name.split('-').find_map(|factor| {
        let digits = factor.strip_prefix("py")?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let (major, minor) = digits.split_at(1);
        Some(if minor.is_empty() {
            format!("python{}", major)
        } else {
            format!("python{}.{}", major, minor)
        })
    })
}

fn applicable<'a>(
    lines: &'a Option<Vec<Conditional<String>>>,
    name: &'a str,
) -> impl Iterator<Item = &'a str> {
    lines
        .iter()
        .flatten()
        .filter(move |entry| entry.applies_to(name))
        .map(|entry| entry.value.as_str())
}

fn context<'a>(
    config: &'a MatrixConfig,
    name: &'a str,
    options: &'a ResolveOptions,
    setenv: &'a BTreeMap<String, String>,
) -> SubstitutionContext<'a> {
    SubstitutionContext {
        root: &config.root,
        env_name: name,
        posargs: &options.posargs,
        setenv,
        process_env: &options.process_env,
        document: Some(config.document()),
    }
}
