//! INI document model and parser for matrix configuration files.
//!
//! Supports the subset used by tox-style configuration: `[section]` headers,
//! `key = value` (or `key: value`) entries, full-line `#`/`;` comments, and
//! indented continuation lines forming multi-line values.

use tracing::debug;

use crate::domain::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub key: String,
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub line: usize,
    pub entries: Vec<IniEntry>,
}

impl IniSection {
    fn new(name: String, line: usize) -> Self {
        Self { name, line, entries: Vec::new() }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|entry| entry.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&IniEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    fn set(&mut self, entry: IniEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == entry.key) {
            debug!(section = %self.name, key = %entry.key, line = entry.line, "key redefined");
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }
}

/// Parsed INI document; sections keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    pub sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }
}

/// Parse INI text, failing on the first structural problem.
///
/// A repeated section header is reported as `AppError::DuplicateProfile`.
pub fn parse(text: &str) -> Result<IniDocument, AppError> {
    let (document, duplicates) = parse_collecting(text)?;
    match duplicates.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(document),
    }
}

/// Parse INI text, collecting duplicate section headers instead of aborting.
///
/// The first declaration of a duplicated section is kept; entries under the
/// repeated header are discarded.
pub fn parse_collecting(text: &str) -> Result<(IniDocument, Vec<AppError>), AppError> {
    let mut document = IniDocument::default();
    let mut duplicates = Vec::new();
    // Index into `document.sections`; `None` while skipping a duplicate section.
    let mut current: Option<usize> = None;
    let mut in_section = false;
    let mut last_key: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.len() != trimmed.len();
        if indented {
            if !in_section {
                return Err(AppError::parse_error(line_no, "indented line before any section"));
            }
            let Some(key) = last_key.as_deref() else {
                return Err(AppError::parse_error(
                    line_no,
                    "continuation line without a preceding key",
                ));
            };
            if let Some(section) = current.map(|i| &mut document.sections[i])
                && let Some(entry) = section.entries.iter_mut().find(|e| e.key == key)
            {
                if !entry.value.is_empty() {
                    entry.value.push('\n');
                }
                entry.value.push_str(trimmed);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']') else {
                return Err(AppError::parse_error(line_no, "unterminated section header"));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::parse_error(line_no, "empty section name"));
            }
            in_section = true;
            last_key = None;
            if document.section(name).is_some() {
                duplicates.push(AppError::DuplicateProfile { name: name.to_string(), line: line_no });
                current = None;
            } else {
                document.sections.push(IniSection::new(name.to_string(), line_no));
                current = Some(document.sections.len() - 1);
            }
            continue;
        }

        if !in_section {
            return Err(AppError::parse_error(line_no, "entry before any section header"));
        }

        let (key, value) = split_entry(trimmed)
            .ok_or_else(|| AppError::parse_error(line_no, "expected 'key = value'"))?;
        if key.is_empty() {
            return Err(AppError::parse_error(line_no, "empty key"));
        }

        last_key = Some(key.to_string());
        if let Some(i) = current {
            document.sections[i].set(IniEntry {
                key: key.to_string(),
                value: value.to_string(),
                line: line_no,
            });
        }
    }

    debug!(sections = document.sections.len(), "parsed matrix configuration");
    Ok((document, duplicates))
}

/// Split `key = value`, falling back to `key: value`.
///
/// A colon before the first `=` means the colon is the separator, so
/// `setenv: A=1` is key `setenv` with value `A=1`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    if let Some((key, value)) = line.split_once('=')
        && !key.contains(':')
    {
        return Some((key.trim(), value.trim()));
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value.trim()))
}
