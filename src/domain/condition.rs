//! Conditional entries (`online: pytest-rerunfailures`).
//!
//! A condition is a comma-separated list of alternatives. Each alternative
//! is a `-`-joined conjunction of factors, and each factor may be negated
//! with `!`. A factor matches a profile when it occurs as a substring of the
//! profile name.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor {
    pub name: String,
    pub negated: bool,
}

impl Factor {
    fn matches(&self, profile_name: &str) -> bool {
        profile_name.contains(self.name.as_str()) != self.negated
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    alternatives: Vec<Vec<Factor>>,
}

impl Condition {
    /// Parse a condition prefix such as `py37-online,!figure`.
    ///
    /// Returns `None` when the text is not a well-formed condition.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() || !text.chars().all(is_factor_char) {
            return None;
        }

        let mut alternatives = Vec::new();
        for alternative in text.split(',') {
            let mut factors = Vec::new();
            for raw in alternative.split('-') {
                let (name, negated) = match raw.strip_prefix('!') {
                    Some(rest) => (rest, true),
                    None => (raw, false),
                };
                if name.is_empty() || name.contains('!') {
                    return None;
                }
                factors.push(Factor { name: name.to_string(), negated });
            }
            alternatives.push(factors);
        }

        Some(Self { alternatives })
    }

    pub fn matches(&self, profile_name: &str) -> bool {
        self.alternatives.iter().any(|all| all.iter().all(|factor| factor.matches(profile_name)))
    }

    pub fn factors(&self) -> impl Iterator<Item = &Factor> {
        self.alternatives.iter().flatten()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .alternatives
            .iter()
            .map(|all| all.iter().map(Factor::to_string).collect::<Vec<_>>().join("-"))
            .collect();
        f.write_str(&rendered.join(","))
    }
}

fn is_factor_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '!' | ',' | '-')
}

/// A value that only applies to profiles matching its condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional<T> {
    pub condition: Option<Condition>,
    pub value: T,
}

impl<T> Conditional<T> {
    pub fn always(value: T) -> Self {
        Self { condition: None, value }
    }

    pub fn applies_to(&self, profile_name: &str) -> bool {
        self.condition.as_ref().is_none_or(|condition| condition.matches(profile_name))
    }
}

impl Conditional<String> {
    /// Split a raw line into its optional condition and value.
    ///
    /// The prefix before the first colon counts as a condition only when it
    /// is made of factor characters and the colon is followed by whitespace,
    /// so `git+https://...` stays a plain value.
    pub fn parse(line: &str) -> Self {
        if let Some((prefix, rest)) = line.split_once(':')
            && rest.starts_with(char::is_whitespace)
            && let Some(condition) = Condition::parse(prefix.trim())
            && !prefix.starts_with(char::is_whitespace)
        {
            return Self { condition: Some(condition), value: rest.trim().to_string() };
        }
        Self::always(line.trim().to_string())
    }

    /// Parse every non-empty line of a multi-line value.
    pub fn parse_lines(value: &str) -> Vec<Self> {
        value.lines().map(str::trim).filter(|line| !line.is_empty()).map(Self::parse).collect()
    }
}
