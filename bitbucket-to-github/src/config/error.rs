//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was not supplied via flag or environment.
    #[error("Missing required configuration value: {name}")]
    MissingValue { name: &'static str },

    /// A shell-command substitution failed to run.
    #[error("Failed to run credential command '{command}': {message}")]
    CommandFailed { command: String, message: String },

    /// A shell-command substitution produced no output.
    #[error("Credential command '{command}' produced no output")]
    EmptyCommandOutput { command: String },
}
