//! Matrix configuration: the `[tox]` header, base `[testenv]`, and named
//! `[testenv:NAME]` profiles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::AppError;
use crate::domain::env_list;
use crate::domain::ini::{self, IniDocument};
use crate::domain::placeholder::expand_references;
use crate::domain::profile::{EnvProfile, ProfileOrigin};

pub const HEADER_SECTION: &str = "tox";
pub const BASE_SECTION: &str = "testenv";
pub const PROFILE_PREFIX: &str = "testenv:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixConfig {
    pub root: PathBuf,
    pub min_version: Option<String>,
    pub skip_missing_interpreters: bool,
    pub env_list: Vec<String>,
    pub base: EnvProfile,
    pub profiles: BTreeMap<String, EnvProfile>,
    /// Explicit profile names in section order.
    section_order: Vec<String>,
    /// Source document with `{[section]key}` references expanded.
    document: IniDocument,
}

impl MatrixConfig {
    /// Parse configuration text rooted at `root`.
    pub fn parse(text: &str, root: &Path) -> Result<Self, AppError> {
        let document = ini::parse(text)?;
        Self::from_document(&document, root)
    }

    pub fn from_document(document: &IniDocument, root: &Path) -> Result<Self, AppError> {
        let document = expand_document(document)?;

        let header = document.section(HEADER_SECTION);
        let env_list = match header.and_then(|s| s.get("envlist")) {
            Some(value) => env_list::expand(value)?,
            None => Vec::new(),
        };
        let min_version = header.and_then(|s| s.get("minversion")).map(str::to_string);
        let skip_missing_interpreters = header
            .and_then(|s| s.get("skip_missing_interpreters"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let base = match document.section(BASE_SECTION) {
            Some(section) => EnvProfile::from_section(BASE_SECTION, ProfileOrigin::Base, section)?,
            None => EnvProfile::generated(BASE_SECTION),
        };

        let mut profiles = BTreeMap::new();
        let mut section_order = Vec::new();
        for section in &document.sections {
            let Some(name) = section.name.strip_prefix(PROFILE_PREFIX) else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::parse_error(section.line, "empty profile name"));
            }
            if profiles.contains_key(name) {
                return Err(AppError::DuplicateProfile { name: name.to_string(), line: section.line });
            }
            let profile = EnvProfile::from_section(name, ProfileOrigin::Section, section)?;
            profiles.insert(name.to_string(), profile);
            section_order.push(name.to_string());
        }

        debug!(
            envlist = env_list.len(),
            sections = profiles.len(),
            root = %root.display(),
            "loaded matrix configuration"
        );

        Ok(Self {
            root: root.to_path_buf(),
            min_version,
            skip_missing_interpreters,
            env_list,
            base,
            profiles,
            section_order,
            document,
        })
    }

    /// Declared profile names: `envlist` order first, then explicit sections
    /// that the envlist does not mention.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.env_list.clone();
        for name in &self.section_order {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Look up an explicit or envlist-generated profile.
    pub fn profile(&self, name: &str) -> Result<EnvProfile, AppError> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.clone());
        }
        if self.env_list.iter().any(|n| n == name) {
            return Ok(EnvProfile::generated(name));
        }
        Err(AppError::ProfileNotFound { name: name.to_string(), available: self.names().join(", ") })
    }

    pub fn document(&self) -> &IniDocument {
        &self.document
    }
}

fn expand_document(document: &IniDocument) -> Result<IniDocument, AppError> {
    let mut expanded = document.clone();
    for section in &mut expanded.sections {
        for entry in &mut section.entries {
            entry.value = expand_references(&entry.value, document)?;
        }
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[tox]
minversion = 3.14
envlist = py{37,38}{,-online}, build_docs
skip_missing_interpreters = True

[base]
online_deps = pytest-rerunfailures

[testenv]
deps =
    online: {[base]online_deps}

[testenv:build_docs]
changedir = {toxinidir}

[testenv:conda]
basepython = python3.8
"#;

    #[test]
    fn reads_header_and_profiles() {
        let config = MatrixConfig::parse(CONFIG, Path::new("/src/sunpy")).unwrap();

        assert_eq!(config.min_version.as_deref(), Some("3.14"));
        assert!(config.skip_missing_interpreters);
        assert_eq!(config.env_list.len(), 5);
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.base.origin, ProfileOrigin::Base);
    }

    #[test]
    fn names_follow_envlist_then_sections() {
        let config = MatrixConfig::parse(CONFIG, Path::new("/src/sunpy")).unwrap();
        assert_eq!(
            config.names(),
            vec!["py37", "py37-online", "py38", "py38-online", "build_docs", "conda"]
        );
    }

    #[test]
    fn references_are_expanded_before_profiles_are_built() {
        let config = MatrixConfig::parse(CONFIG, Path::new("/src/sunpy")).unwrap();
        let deps = config.base.deps.as_ref().unwrap();
        assert_eq!(deps[0].value, "pytest-rerunfailures");
        assert!(deps[0].applies_to("py38-online"));
    }

    #[test]
    fn generated_and_missing_profiles() {
        let config = MatrixConfig::parse(CONFIG, Path::new("/src/sunpy")).unwrap();

        assert_eq!(config.profile("py38").unwrap().origin, ProfileOrigin::EnvList);
        assert_eq!(config.profile("conda").unwrap().origin, ProfileOrigin::Section);
        let err = config.profile("py39").unwrap_err();
        assert!(matches!(err, AppError::ProfileNotFound { name, .. } if name == "py39"));
    }

    #[test]
    fn trimmed_names_must_stay_unique() {
        let err = MatrixConfig::parse("[testenv:docs]\n[testenv: docs]\n", Path::new(".")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateProfile { line: 2, .. }));
    }

    #[test]
    fn empty_profile_name_is_rejected() {
        let err = MatrixConfig::parse("[testenv:]\n", Path::new(".")).unwrap_err();
        assert!(matches!(err, AppError::Parse { line: 1, .. }));
    }
}
