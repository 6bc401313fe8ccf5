//! API client error types

use contracts::ContractError;
use thiserror::Error;

/// Client construction errors
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// TLS credential file could not be read
    #[error("failed to read TLS credential '{path}': {source}")]
    Credential {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

impl From<ApiClientError> for ContractError {
    fn from(err: ApiClientError) -> Self {
        ContractError::config_validation("server", err.to_string())
    }
}

/// Map a feed transport error onto the reconnect taxonomy
///
/// Body and decode failures happen mid-stream and reconnect immediately;
/// connect and timeout failures wait out the reconnect delay, as does
/// anything else.
pub(crate) fn classify_feed_error(err: reqwest::Error) -> ContractError {
    if err.is_body() || err.is_decode() {
        ContractError::FeedStream {
            message: err.to_string(),
        }
    } else if err.is_connect() || err.is_timeout() {
        ContractError::FeedConnection {
            message: err.to_string(),
        }
    } else {
        ContractError::FeedRequest {
            message: err.to_string(),
        }
    }
}
