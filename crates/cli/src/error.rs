//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration rejected after CLI overrides
    #[error("Invalid configuration after overrides: {0}")]
    Override(#[source] contracts::ContractError),

    /// Subscription loop stopped with an unrecoverable error
    #[error("Subscription stopped: {0}")]
    Subscription(#[source] contracts::ContractError),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }
}
