//! Layered error definitions
//!
//! Categorized by source: config / feed / order / packet / sink

use thiserror::Error;

/// How the subscription loop should react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Reconnect right away
    Immediate,
    /// Reconnect after the configured delay
    Backoff,
    /// Stop the loop
    Fatal,
}

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Feed Errors =====
    /// Stream broke mid-body (truncated chunk, decode failure)
    #[error("feed stream error: {message}")]
    FeedStream { message: String },

    /// Could not reach the feed endpoint
    #[error("feed connection error: {message}")]
    FeedConnection { message: String },

    /// Any other feed request failure (HTTP status, request build)
    #[error("feed request error: {message}")]
    FeedRequest { message: String },

    /// Event body is not a valid order
    #[error("malformed feed event: {message}")]
    MalformedEvent { message: String },

    // ===== Order Errors =====
    /// Payload retrieval failed
    #[error("order fetch error for seq {seq_num}: {message}")]
    OrderFetch { seq_num: u32, message: String },

    /// Transmission confirmation failed
    #[error("order confirm error for seq {seq_num}: {message}")]
    OrderConfirm { seq_num: u32, message: String },

    // ===== Packet Errors =====
    /// Payload could not be fragmented
    #[error("fragmentation error for seq {seq_num}: {message}")]
    Fragmentation { seq_num: u32, message: String },

    /// Datagram could not be parsed as a link packet
    #[error("packet parse error: {message}")]
    PacketParse { message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create order fetch error
    pub fn order_fetch(seq_num: u32, message: impl Into<String>) -> Self {
        Self::OrderFetch {
            seq_num,
            message: message.into(),
        }
    }

    /// Create order confirmation error
    pub fn order_confirm(seq_num: u32, message: impl Into<String>) -> Self {
        Self::OrderConfirm {
            seq_num,
            message: message.into(),
        }
    }

    /// Create fragmentation error
    pub fn fragmentation(seq_num: u32, message: impl Into<String>) -> Self {
        Self::Fragmentation {
            seq_num,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Classify for the reconnect loop.
    ///
    /// Mid-stream failures reconnect immediately, configuration problems are
    /// fatal, everything else waits out the reconnect delay first.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::FeedStream { .. } => RetryPolicy::Immediate,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => RetryPolicy::Fatal,
            _ => RetryPolicy::Backoff,
        }
    }
}
