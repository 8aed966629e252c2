//! Generative environment lists (`py{37,38}{,-online}`).

use std::collections::HashSet;

use crate::domain::AppError;

/// Expand an `envlist` value into profile names.
///
/// Entries are separated by commas or newlines. Brace groups expand to the
/// cartesian product of their alternatives; an empty alternative leaves the
/// surrounding text, with doubled or dangling `-` separators collapsed.
/// Declaration order is preserved and duplicates are dropped.
pub fn expand(envlist: &str) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    Ok(expand_in_order(envlist)?.into_iter().filter(|name| seen.insert(name.clone())).collect())
}

/// Names produced more than once by an `envlist` value, in first-seen order.
pub fn duplicates(envlist: &str) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for name in expand_in_order(envlist)? {
        if !seen.insert(name.clone()) && !repeated.contains(&name) {
            repeated.push(name);
        }
    }
    Ok(repeated)
}

fn expand_in_order(envlist: &str) -> Result<Vec<String>, AppError> {
    let mut names = Vec::new();
    for entry in split_top_level(envlist, |c| c == ',' || c == '\n')? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        for name in expand_entry(entry)? {
            let name = tidy(&name);
            if !name.is_empty() {
                names.push(name);
            }
        }
    }
    Ok(names)
}

fn expand_entry(entry: &str) -> Result<Vec<String>, AppError> {
    let Some(open) = entry.find('{') else {
        if entry.contains('}') {
            return Err(unbalanced(entry));
        }
        return Ok(vec![entry.to_string()]);
    };

    let close = matching_close(entry, open).ok_or_else(|| unbalanced(entry))?;
    let prefix = &entry[..open];
    if prefix.contains('}') {
        return Err(unbalanced(entry));
    }
    let group = &entry[open + 1..close];
    let suffix = &entry[close + 1..];

    let mut expanded = Vec::new();
    for alternative in split_top_level(group, |c| c == ',')? {
        for tail in expand_entry(&format!("{}{}", alternative.trim(), suffix))? {
            expanded.push(format!("{}{}", prefix, tail));
        }
    }
    Ok(expanded)
}

fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Result<Vec<&str>, AppError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.checked_sub(1).ok_or_else(|| unbalanced(text))?,
            c if depth == 0 && is_separator(c) => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced(text));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn tidy(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn unbalanced(text: &str) -> AppError {
    AppError::config_error(format!("Unbalanced braces in envlist entry '{}'", text.trim()))
}
