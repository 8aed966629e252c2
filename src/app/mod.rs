pub mod cli;
pub mod commands;
mod context;
pub mod observability;
pub mod output;
pub mod settings;

pub use context::AppContext;
