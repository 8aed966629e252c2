//! Tracing initialization.
//!
//! Level comes from `RUST_LOG` when set, otherwise from `ENVMATRIX_LOG` or the
//! `-v` count. `ENVMATRIX_LOG_JSON=1` switches to JSON lines. Logs go to
//! stderr so stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, prelude::*};

pub const LOG_ENV_VAR: &str = "ENVMATRIX_LOG";
pub const LOG_JSON_ENV_VAR: &str = "ENVMATRIX_LOG_JSON";

/// Default filter directive for a given `-v` count.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "envmatrix=warn",
        1 => "envmatrix=info",
        2 => "envmatrix=debug",
        _ => "envmatrix=trace",
    }
}

/// Initialize tracing. Call once at process startup.
pub fn init_tracing(verbose: u8) {
    let level = match std::env::var(LOG_ENV_VAR) {
        Ok(level) if !level.is_empty() && verbose == 0 => level,
        _ => level_for_verbosity(verbose).to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let json = std::env::var(LOG_JSON_ENV_VAR).is_ok_and(|v| v == "1" || v == "true");

    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}
