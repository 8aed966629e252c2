pub mod config_file;
pub mod process_runner;

pub use config_file::FilesystemConfigSource;
pub use process_runner::ProcessCommandRunner;
