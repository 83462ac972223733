//! CLI error handling.

use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid combination of command-line options
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to start the async runtime
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl CliError {
    /// Print the error and terminate with a non-zero exit code.
    pub fn exit(self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(1);
    }
}
