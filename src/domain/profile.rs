//! Environment profiles: raw declarations and their resolved form.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::AppError;
use crate::domain::condition::Conditional;
use crate::domain::ini::IniSection;

/// Keys understood in `[testenv]` and `[testenv:NAME]` sections.
pub const KNOWN_KEYS: &[&str] = &[
    "description",
    "basepython",
    "changedir",
    "setenv",
    "deps",
    "extras",
    "commands",
    "passenv",
    "allowlist_externals",
    "whitelist_externals",
    "conda_deps",
    "conda_channels",
    "skip_install",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileOrigin {
    /// The shared `[testenv]` section.
    Base,
    /// An explicit `[testenv:NAME]` section.
    Section,
    /// Named only in `envlist`; everything comes from the base.
    EnvList,
}

type Lines = Option<Vec<Conditional<String>>>;

/// A profile as declared, before inheritance and substitution.
///
/// `None` means the key is not set on this profile and is inherited from the
/// base section during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvProfile {
    pub name: String,
    pub origin: ProfileOrigin,
    pub line: usize,
    pub description: Option<String>,
    pub basepython: Option<String>,
    pub changedir: Option<String>,
    pub setenv: Lines,
    pub deps: Lines,
    pub extras: Lines,
    pub commands: Lines,
    pub passenv: Lines,
    pub allowlist_externals: Lines,
    pub conda_deps: Lines,
    pub conda_channels: Lines,
    pub skip_install: Option<bool>,
}

impl EnvProfile {
    fn empty(name: &str, origin: ProfileOrigin, line: usize) -> Self {
        Self {
            name: name.to_string(),
            origin,
            line,
            description: None,
            basepython: None,
            changedir: None,
            setenv: None,
            deps: None,
            extras: None,
            commands: None,
            passenv: None,
            allowlist_externals: None,
            conda_deps: None,
            conda_channels: None,
            skip_install: None,
        }
    }

    /// Profile named only in `envlist`.
    pub fn generated(name: &str) -> Self {
        Self::empty(name, ProfileOrigin::EnvList, 0)
    }

    /// Build a profile from a section whose values already had `{[section]key}`
    /// references expanded.
    pub fn from_section(
        name: &str,
        origin: ProfileOrigin,
        section: &IniSection,
    ) -> Result<Self, AppError> {
        let mut profile = Self::empty(name, origin, section.line);
        let text = |key: &str| section.get(key).map(str::to_string);

        profile.description = text("description");
        profile.basepython = text("basepython");
        profile.changedir = text("changedir");
        profile.setenv = section.get("setenv").map(Conditional::parse_lines);
        profile.deps = section.get("deps").map(Conditional::parse_lines);
        profile.commands =
            section.get("commands").map(|value| Conditional::parse_lines(&join_continuations(value)));
        profile.conda_deps = section.get("conda_deps").map(Conditional::parse_lines);
        profile.extras = section.get("extras").map(parse_comma_lines);
        profile.passenv = section.get("passenv").map(parse_word_lines);
        profile.allowlist_externals = section
            .get("allowlist_externals")
            .or_else(|| section.get("whitelist_externals"))
            .map(parse_comma_lines);
        profile.conda_channels = section.get("conda_channels").map(parse_comma_lines);
        profile.skip_install = match section.entry("skip_install") {
            Some(entry) => Some(parse_bool(&entry.value).ok_or_else(|| {
                AppError::parse_error(
                    entry.line,
                    format!("skip_install must be true or false, got '{}'", entry.value),
                )
            })?),
            None => None,
        };

        Ok(profile)
    }

    /// Fill every unset key from `base`.
    pub fn inherit(&self, base: &EnvProfile) -> EnvProfile {
        fn pick<T: Clone>(own: &Option<T>, base: &Option<T>) -> Option<T> {
            own.as_ref().or(base.as_ref()).cloned()
        }

        EnvProfile {
            name: self.name.clone(),
            origin: self.origin,
            line: self.line,
            description: pick(&self.description, &base.description),
            basepython: pick(&self.basepython, &base.basepython),
            changedir: pick(&self.changedir, &base.changedir),
            setenv: pick(&self.setenv, &base.setenv),
            deps: pick(&self.deps, &base.deps),
            extras: pick(&self.extras, &base.extras),
            commands: pick(&self.commands, &base.commands),
            passenv: pick(&self.passenv, &base.passenv),
            allowlist_externals: pick(&self.allowlist_externals, &base.allowlist_externals),
            conda_deps: pick(&self.conda_deps, &base.conda_deps),
            conda_channels: pick(&self.conda_channels, &base.conda_channels),
            skip_install: pick(&self.skip_install, &base.skip_install),
        }
    }

    /// Every conditional entry declared on this profile, with its key.
    pub fn conditional_entries(&self) -> impl Iterator<Item = (&'static str, &Conditional<String>)> {
        [
            ("setenv", &self.setenv),
            ("deps", &self.deps),
            ("extras", &self.extras),
            ("commands", &self.commands),
            ("passenv", &self.passenv),
            ("allowlist_externals", &self.allowlist_externals),
            ("conda_deps", &self.conda_deps),
            ("conda_channels", &self.conda_channels),
        ]
        .into_iter()
        .flat_map(|(key, lines)| lines.iter().flatten().map(move |entry| (key, entry)))
    }
}

fn parse_comma_lines(value: &str) -> Vec<Conditional<String>> {
    parse_list_lines(value, |c| c == ',')
}

/// `passenv` also accepts whitespace-separated names (`HOME WINDIR LC_ALL`).
fn parse_word_lines(value: &str) -> Vec<Conditional<String>> {
    parse_list_lines(value, |c| c == ',' || c.is_whitespace())
}

fn parse_list_lines(value: &str, is_separator: fn(char) -> bool) -> Vec<Conditional<String>> {
    Conditional::parse_lines(value)
        .into_iter()
        .flat_map(|entry| {
            let condition = entry.condition;
            entry
                .value
                .split(is_separator)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Conditional { condition: condition.clone(), value: item.to_string() })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Join command lines ending in a backslash with the line that follows.
fn join_continuations(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for line in value.lines() {
        match line.trim_end().strip_suffix('\\') {
            Some(head) => {
                out.push_str(head.trim_end());
                out.push(' ');
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// One command line ready to hand to a process runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCommand {
    pub line: String,
    pub argv: Vec<String>,
    /// Exit status is ignored (command was prefixed with `-`).
    pub ignore_errors: bool,
}

/// A profile after inheritance, condition filtering, and substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basepython: Option<String>,
    pub working_dir: PathBuf,
    pub skip_install: bool,
    pub deps: Vec<String>,
    pub extras: BTreeSet<String>,
    pub passenv: Vec<String>,
    pub allowlist_externals: Vec<String>,
    pub conda_deps: Vec<String>,
    pub conda_channels: Vec<String>,
    // Tables last so the TOML rendering stays valid.
    pub setenv: BTreeMap<String, String>,
    pub commands: Vec<ResolvedCommand>,
}
