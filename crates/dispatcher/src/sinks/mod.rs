//! Sink implementations
//!
//! Contains UdpSink, FileSink and LogSink, plus the `OutputTarget` wrapper
//! built from configuration.

mod file;
mod log;
mod udp;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::udp::{UdpSink, UdpSinkConfig};

use contracts::{ContractError, OutputSink, SinkConfig, SinkType};
use tracing::instrument;

use crate::error::DispatcherError;

/// Any configured output target
pub enum OutputTarget {
    Udp(UdpSink),
    File(FileSink),
    Log(LogSink),
}

impl OutputTarget {
    /// Create an OutputTarget from configuration
    #[instrument(
        name = "output_target_from_config",
        skip(config),
        fields(sink = %config.name, sink_type = ?config.sink_type)
    )]
    pub async fn from_config(config: &SinkConfig) -> Result<Self, DispatcherError> {
        let map_err = |e: ContractError| DispatcherError::sink_creation(&config.name, e.to_string());
        match config.sink_type {
            SinkType::Log => Ok(Self::Log(LogSink::new(&config.name))),
            SinkType::File => FileSink::from_params(&config.name, &config.params)
                .await
                .map(Self::File)
                .map_err(map_err),
            SinkType::Udp => UdpSink::from_params(&config.name, &config.params)
                .await
                .map(Self::Udp)
                .map_err(map_err),
        }
    }
}

impl OutputSink for OutputTarget {
    fn name(&self) -> &str {
        match self {
            Self::Udp(s) => s.name(),
            Self::File(s) => s.name(),
            Self::Log(s) => s.name(),
        }
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), ContractError> {
        match self {
            Self::Udp(s) => s.send(data).await,
            Self::File(s) => s.send(data).await,
            Self::Log(s) => s.send(data).await,
        }
    }
}

/// Open every configured target, in configuration order
#[instrument(name = "create_targets", skip(configs), fields(count = configs.len()))]
pub async fn create_targets(configs: &[SinkConfig]) -> Result<Vec<OutputTarget>, DispatcherError> {
    let mut targets = Vec::with_capacity(configs.len());
    for config in configs {
        targets.push(OutputTarget::from_config(config).await?);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_create_targets_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let configs = vec![
            SinkConfig {
                name: "log".to_string(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "file".to_string(),
                sink_type: SinkType::File,
                params: HashMap::from([(
                    "path".to_string(),
                    dir.path().join("out.bin").display().to_string(),
                )]),
            },
            SinkConfig {
                name: "udp".to_string(),
                sink_type: SinkType::Udp,
                params: HashMap::from([("addr".to_string(), "127.0.0.1:4433".to_string())]),
            },
        ];

        let targets = create_targets(&configs).await.unwrap();
        let names: Vec<_> = targets.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["log", "file", "udp"]);
    }

    #[tokio::test]
    async fn test_create_target_reports_sink_name() {
        let config = SinkConfig {
            name: "broken".to_string(),
            sink_type: SinkType::Udp,
            params: HashMap::new(),
        };
        let err = OutputTarget::from_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("broken"));
    }
}
