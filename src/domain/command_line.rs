//! POSIX-style splitting of command templates into argument vectors.

use crate::domain::AppError;

/// Split a command line into arguments.
///
/// Supports single quotes (literal), double quotes (with `\"` and `\\`
/// escapes), and backslash escapes outside quotes. No globbing or variable
/// expansion is performed.
pub fn split(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(unterminated(line, '\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(unterminated(line, '"')),
                        },
                        Some(c) => current.push(c),
                        None => return Err(unterminated(line, '"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }
    Ok(args)
}

fn unterminated(line: &str, quote: char) -> AppError {
    AppError::config_error(format!("Unterminated {} quote in command '{}'", quote, line))
}
