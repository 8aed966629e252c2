//! Individual schema checks over the parsed document and matrix.

use crate::domain::env_list;
use crate::domain::ini::{IniDocument, IniEntry, IniSection};
use crate::domain::matrix::{BASE_SECTION, HEADER_SECTION, PROFILE_PREFIX};
use crate::domain::placeholder::{Placeholder, Segment, scan};
use crate::domain::profile::KNOWN_KEYS;
use crate::domain::{AppError, MatrixConfig, ProfileOrigin, ResolveOptions, resolve};

use super::diagnostics::Diagnostics;

fn entry_location(origin: &str, section: &IniSection, entry: &IniEntry) -> String {
    format!("{}:{} [{}] {}", origin, entry.line, section.name, entry.key)
}

fn is_profile_section(name: &str) -> bool {
    name == BASE_SECTION || name.starts_with(PROFILE_PREFIX)
}

/// Every brace token must belong to the known placeholder set, and every
/// `{[section]key}` reference must point at an existing key.
pub fn placeholder_checks(origin: &str, document: &IniDocument, diagnostics: &mut Diagnostics) {
    for section in &document.sections {
        for entry in &section.entries {
            for segment in scan(&entry.value) {
                let Segment::Token(inner) = segment else {
                    continue;
                };
                match Placeholder::parse(inner) {
                    Err(err) => {
                        diagnostics.push_error(entry_location(origin, section, entry), err.to_string())
                    }
                    Ok(Placeholder::Reference { section: target, key }) => {
                        if document.get(&target, &key).is_none() {
                            let err = AppError::MissingReference { section: target, key };
                            diagnostics
                                .push_error(entry_location(origin, section, entry), err.to_string());
                        }
                    }
                    Ok(_) => {}
                }
            }
        }
    }
}

pub fn envlist_checks(origin: &str, document: &IniDocument, diagnostics: &mut Diagnostics) {
    let Some(section) = document.section(HEADER_SECTION) else {
        diagnostics.push_warning(origin, "no [tox] section; envlist is empty");
        return;
    };
    let Some(entry) = section.entry("envlist") else {
        return;
    };

    match env_list::duplicates(&entry.value) {
        Ok(repeated) => {
            for name in repeated {
                diagnostics.push_warning(
                    entry_location(origin, section, entry),
                    format!("'{}' is listed more than once", name),
                );
            }
        }
        Err(err) => diagnostics.push_error(entry_location(origin, section, entry), err.to_string()),
    }
}

/// Unknown keys in profile sections, and explicit profiles the envlist omits.
pub fn section_checks(
    origin: &str,
    document: &IniDocument,
    config: &MatrixConfig,
    diagnostics: &mut Diagnostics,
) {
    for section in document.sections.iter().filter(|s| is_profile_section(&s.name)) {
        for entry in &section.entries {
            if !KNOWN_KEYS.contains(&entry.key.as_str()) {
                diagnostics.push_warning(
                    entry_location(origin, section, entry),
                    format!("unknown key '{}'", entry.key),
                );
            }
        }
    }

    if config.env_list.is_empty() {
        return;
    }
    for (name, profile) in &config.profiles {
        if !config.env_list.contains(name) {
            diagnostics.push_warning(
                format!("{}:{} [{}{}]", origin, profile.line, PROFILE_PREFIX, name),
                "profile is not listed in envlist",
            );
        }
    }
}

/// Each factor of a conditional entry must occur in at least one declared
/// profile name. Conditions on an explicit profile that can never match
/// that profile are flagged as well.
pub fn condition_checks(origin: &str, config: &MatrixConfig, diagnostics: &mut Diagnostics) {
    let names = config.names();

    for profile in std::iter::once(&config.base).chain(config.profiles.values()) {
        let section = match profile.origin {
            ProfileOrigin::Base => BASE_SECTION.to_string(),
            _ => format!("{}{}", PROFILE_PREFIX, profile.name),
        };
        let location = format!("{}:{} [{}]", origin, profile.line, section);

        for (key, entry) in profile.conditional_entries() {
            let Some(condition) = &entry.condition else {
                continue;
            };
            for factor in condition.factors() {
                if !names.iter().any(|name| name.contains(factor.name.as_str())) {
                    diagnostics.push_error(
                        location.clone(),
                        format!(
                            "{}: condition '{}' uses factor '{}' that matches no declared profile",
                            key, condition, factor.name
                        ),
                    );
                }
            }
            if profile.origin == ProfileOrigin::Section && !condition.matches(&profile.name) {
                diagnostics.push_warning(
                    location.clone(),
                    format!("{}: condition '{}' never applies to '{}'", key, condition, profile.name),
                );
            }
        }
    }
}

/// Resolve every declared profile with no extra arguments.
///
/// Placeholder problems are left to `placeholder_checks`.
pub fn resolution_checks(origin: &str, config: &MatrixConfig, diagnostics: &mut Diagnostics) {
    let options = ResolveOptions::default();
    for name in config.names() {
        match resolve(config, &name, &options) {
            Ok(_) => {}
            Err(AppError::UnknownPlaceholder { .. } | AppError::MissingReference { .. }) => {}
            Err(err) => diagnostics.push_error(format!("{} [{}]", origin, name), err.to_string()),
        }
    }
}
