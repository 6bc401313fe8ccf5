//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Bit rate is not a positive finite number
    #[error("invalid bit rate {0} kbps")]
    InvalidBitrate(f64),

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<DispatcherError> for contracts::ContractError {
    fn from(err: DispatcherError) -> Self {
        match err {
            DispatcherError::Contract(e) => e,
            other => contracts::ContractError::Other(other.to_string()),
        }
    }
}
