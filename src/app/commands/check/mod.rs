mod diagnostics;
mod rules;

use crate::app::AppContext;
use crate::domain::ini;
use crate::domain::{AppError, MatrixConfig};
use crate::ports::{CommandRunner, ConfigSource};

pub use diagnostics::{Diagnostic, Diagnostics, Severity};

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub strict: bool,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub errors: usize,
    pub warnings: usize,
    pub exit_code: i32,
    pub diagnostics: Diagnostics,
}

/// Validate the matrix configuration and report diagnostics on stderr.
///
/// Exit code is 1 on errors, 2 on warnings in strict mode, 0 otherwise.
pub fn execute<S, R>(ctx: &AppContext<S, R>, options: CheckOptions) -> Result<CheckOutcome, AppError>
where
    S: ConfigSource,
    R: CommandRunner,
{
    let loaded = ctx.load_source()?;
    let origin = loaded.origin.as_str();
    let mut diagnostics = Diagnostics::default();

    match ini::parse_collecting(&loaded.text) {
        Err(err) => diagnostics.push_error(origin, err.to_string()),
        Ok((document, duplicates)) => {
            for duplicate in duplicates {
                diagnostics.push_error(origin, duplicate.to_string());
            }

            rules::placeholder_checks(origin, &document, &mut diagnostics);
            rules::envlist_checks(origin, &document, &mut diagnostics);

            match MatrixConfig::from_document(&document, &loaded.root) {
                Ok(config) => {
                    rules::section_checks(origin, &document, &config, &mut diagnostics);
                    rules::condition_checks(origin, &config, &mut diagnostics);
                    rules::resolution_checks(origin, &config, &mut diagnostics);
                }
                // Already reported by the placeholder and envlist checks.
                Err(AppError::MissingReference { .. }) => {}
                Err(AppError::Configuration(msg)) if msg.contains("envlist") => {}
                Err(err) => diagnostics.push_error(origin, err.to_string()),
            }
        }
    }

    diagnostics.emit();

    let errors = diagnostics.count(Severity::Error);
    let warnings = diagnostics.count(Severity::Warning);
    let exit_code = if errors > 0 {
        1
    } else if warnings > 0 && options.strict {
        2
    } else {
        0
    };

    if errors == 0 && warnings == 0 {
        println!("All checks passed.");
    } else if errors == 0 && !options.strict {
        eprintln!("Check completed with {} warning(s).", warnings);
    } else {
        eprintln!("Check failed: {} error(s), {} warning(s) found.", errors, warnings);
    }

    Ok(CheckOutcome { errors, warnings, exit_code, diagnostics })
}
