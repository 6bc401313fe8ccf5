//! ReceiverConfig - Config Loader output
//!
//! Server endpoint, transmission parameters and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// API server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Transmission settings
    #[serde(default)]
    pub transmission: TransmissionConfig,

    /// Output targets
    pub sinks: Vec<SinkConfig>,
}

/// API server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server base URL (API root)
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Client certificate (PEM) for mutual TLS
    #[serde(default)]
    pub tls_cert: Option<PathBuf>,

    /// Client key (PEM) for mutual TLS
    #[serde(default)]
    pub tls_key: Option<PathBuf>,

    /// Delay before reconnecting after a connection or request failure
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Timeout for order fetch/confirm requests
    #[serde(default = "default_request_timeout_s")]
    pub request_timeout_s: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            tls_cert: None,
            tls_key: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            request_timeout_s: default_request_timeout_s(),
        }
    }
}

fn default_server_url() -> String {
    "https://api.blockstream.space".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_s() -> u64 {
    30
}

/// Transmission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionConfig {
    /// Order status that triggers a transmission
    #[serde(default = "default_trigger_status")]
    pub trigger_status: String,

    /// API channel number stamped on every packet
    #[serde(default = "default_channel")]
    pub channel: u8,

    /// Target bit rate in kbps
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: f64,

    /// Regions reported in the transmission confirmation
    #[serde(default)]
    pub regions: Vec<u8>,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            trigger_status: default_trigger_status(),
            channel: default_channel(),
            bitrate_kbps: default_bitrate_kbps(),
            regions: Vec::new(),
        }
    }
}

fn default_trigger_status() -> String {
    "transmitting".to_string()
}

fn default_channel() -> u8 {
    1
}

/// Lowest accepted transmission bit rate (100 bit/s)
pub const MIN_BITRATE_KBPS: f64 = 0.1;

fn default_bitrate_kbps() -> f64 {
    1000.0
}

/// Output target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log packet summaries
    Log,
    /// Append raw packets to a file or pipe
    File,
    /// UDP datagrams (unicast or multicast)
    Udp,
}
