//! CLI error type.

use thiserror::Error;

use tilepack::controller::ControllerError;
use tilepack::ConfigError;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration problem (missing value, unknown key, unreadable file).
    #[error("configuration error: {0}")]
    Config(String),

    /// The controller rejected or failed an operation.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Process-level setup failed (signal handler, terminal).
    #[error("{0}")]
    Runtime(String),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
