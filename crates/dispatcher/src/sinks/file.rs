//! FileSink - appends raw packets to a file or named pipe

use contracts::{ContractError, OutputSink};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file (created if missing)
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .ok_or_else(|| "missing 'path' parameter".to_string())?;
        Ok(Self { path })
    }
}

/// Sink that appends packets to a file
pub struct FileSink {
    name: String,
    file: File,
}

impl FileSink {
    /// Open (or create) the output file in append mode
    pub async fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .await?;
        debug!(sink = %name, path = %config.path.display(), "FileSink opened");
        Ok(Self { name, file })
    }

    /// Create from params map (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config =
            FileSinkConfig::from_params(params).map_err(|e| ContractError::SinkConnection {
                sink_name: name.clone(),
                message: e,
            })?;
        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }
}

impl OutputSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), ContractError> {
        self.file
            .write_all(data)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        self.file
            .flush()
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
