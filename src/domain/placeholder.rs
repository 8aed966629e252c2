//! Placeholder tokens inside configuration values.
//!
//! Known tokens: `{toxinidir}`, `{envname}`, `{posargs}` / `{posargs:default}`,
//! `{env:NAME}` / `{env:NAME:default}`, and `{[section]key}`. Defaults may
//! themselves contain tokens. Empty braces `{}` and unmatched braces are
//! literal text.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::AppError;
use crate::domain::ini::IniDocument;

const MAX_REFERENCE_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Project root directory (`{toxinidir}`).
    RootDir,
    /// Profile name (`{envname}`).
    EnvName,
    /// Extra positional arguments from the invoking command line.
    PosArgs { default: Option<String> },
    /// Environment value, looked up in the profile's `setenv` then the process.
    Env { name: String, default: Option<String> },
    /// Cross-section reference (`{[testenv]deps}`).
    Reference { section: String, key: String },
}

impl Placeholder {
    /// Parse the text between the braces of a token.
    pub fn parse(inner: &str) -> Result<Self, AppError> {
        let unknown = || AppError::UnknownPlaceholder { token: inner.to_string() };

        if let Some(rest) = inner.strip_prefix('[') {
            let (section, key) = rest.split_once(']').ok_or_else(unknown)?;
            if section.is_empty() || key.is_empty() {
                return Err(unknown());
            }
            return Ok(Placeholder::Reference { section: section.into(), key: key.into() });
        }

        let (head, tail) = match inner.split_once(':') {
            Some((head, tail)) => (head, Some(tail)),
            None => (inner, None),
        };

        match (head, tail) {
            ("toxinidir", None) => Ok(Placeholder::RootDir),
            ("envname", None) => Ok(Placeholder::EnvName),
            ("posargs", default) => Ok(Placeholder::PosArgs { default: default.map(String::from) }),
            ("env", Some(rest)) => {
                let (name, default) = match rest.split_once(':') {
                    Some((name, default)) => (name, Some(default.to_string())),
                    None => (rest, None),
                };
                if name.is_empty() {
                    return Err(unknown());
                }
                Ok(Placeholder::Env { name: name.to_string(), default })
            }
            _ => Err(unknown()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// Token text without the surrounding braces.
    Token(&'a str),
}

/// Split a template into literal text and brace tokens, honouring nesting.
pub fn scan(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let Some(close) = matching_brace(bytes, i) else {
            i += 1;
            continue;
        };
        if close == i + 1 {
            i = close + 1;
            continue;
        }
        if literal_start < i {
            segments.push(Segment::Literal(&template[literal_start..i]));
        }
        segments.push(Segment::Token(&template[i + 1..close]));
        i = close + 1;
        literal_start = i;
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Values available while substituting placeholders for one profile.
#[derive(Debug, Clone)]
pub struct SubstitutionContext<'a> {
    pub root: &'a Path,
    pub env_name: &'a str,
    pub posargs: &'a [String],
    pub setenv: &'a BTreeMap<String, String>,
    pub process_env: &'a BTreeMap<String, String>,
    pub document: Option<&'a IniDocument>,
}

impl SubstitutionContext<'_> {
    fn lookup_env(&self, name: &str) -> Option<&str> {
        self.setenv.get(name).or_else(|| self.process_env.get(name)).map(String::as_str)
    }
}

/// Replace every placeholder in `template`.
pub fn substitute(template: &str, ctx: &SubstitutionContext<'_>) -> Result<String, AppError> {
    substitute_at_depth(template, ctx, 0)
}

fn substitute_at_depth(
    template: &str,
    ctx: &SubstitutionContext<'_>,
    depth: usize,
) -> Result<String, AppError> {
    if depth > MAX_REFERENCE_DEPTH {
        return Err(AppError::config_error(format!(
            "Substitution nested too deeply while expanding '{}'",
            template
        )));
    }

    let mut out = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(inner) => {
                let value = match Placeholder::parse(inner)? {
                    Placeholder::RootDir => ctx.root.display().to_string(),
                    Placeholder::EnvName => ctx.env_name.to_string(),
                    Placeholder::PosArgs { default } => {
                        if ctx.posargs.is_empty() {
                            match default {
                                Some(default) => substitute_at_depth(&default, ctx, depth + 1)?,
                                None => String::new(),
                            }
                        } else {
                            join_posargs(ctx.posargs)
                        }
                    }
                    Placeholder::Env { name, default } => match ctx.lookup_env(&name) {
                        Some(value) => value.to_string(),
                        None => match default {
                            Some(default) => substitute_at_depth(&default, ctx, depth + 1)?,
                            None => String::new(),
                        },
                    },
                    Placeholder::Reference { section, key } => {
                        let raw = lookup_reference(ctx.document, &section, &key)?;
                        substitute_at_depth(raw, ctx, depth + 1)?
                    }
                };
                out.push_str(&value);
            }
        }
    }
    Ok(out)
}

/// Expand only `{[section]key}` references, leaving other tokens in place.
///
/// References are textual, so a referenced multi-line value keeps its
/// conditional prefixes for later evaluation.
pub fn expand_references(template: &str, document: &IniDocument) -> Result<String, AppError> {
    expand_references_at_depth(template, document, 0)
}

fn expand_references_at_depth(
    template: &str,
    document: &IniDocument,
    depth: usize,
) -> Result<String, AppError> {
    if depth > MAX_REFERENCE_DEPTH {
        return Err(AppError::config_error(format!(
            "Section references nested too deeply while expanding '{}'",
            template
        )));
    }

    let mut out = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Token(inner) => match Placeholder::parse(inner) {
                Ok(Placeholder::Reference { section, key }) => {
                    let raw = lookup_reference(Some(document), &section, &key)?;
                    out.push_str(&expand_references_at_depth(raw, document, depth + 1)?);
                }
                _ => {
                    out.push('{');
                    out.push_str(inner);
                    out.push('}');
                }
            },
        }
    }
    Ok(out)
}

fn lookup_reference<'d>(
    document: Option<&'d IniDocument>,
    section: &str,
    key: &str,
) -> Result<&'d str, AppError> {
    document.and_then(|doc| doc.get(section, key)).ok_or_else(|| AppError::MissingReference {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn join_posargs(args: &[String]) -> String {
    args.iter().map(|arg| quote_arg(arg)).collect::<Vec<_>>().join(" ")
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg.chars().any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\'));
    if !needs_quotes {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
