mod command_runner;
mod config_source;

pub use command_runner::{CommandRunner, RunEnv};
pub use config_source::{ConfigSource, LoadedConfig};
