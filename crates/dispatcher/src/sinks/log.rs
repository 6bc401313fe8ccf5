//! LogSink - logs packet summaries via tracing

use contracts::{ContractError, OutputSink};
use tracing::info;

/// Sink that logs packets instead of sending them
pub struct LogSink {
    name: String,
    packets: u64,
    bytes: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packets: 0,
            bytes: 0,
        }
    }

    /// Packets logged so far
    pub fn packets(&self) -> u64 {
        self.packets
    }
}

impl OutputSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), ContractError> {
        self.packets += 1;
        self.bytes += data.len() as u64;
        info!(
            sink = %self.name,
            packet = self.packets,
            bytes = data.len(),
            total_bytes = self.bytes,
            "Packet"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_counts() {
        let mut sink = LogSink::new("test_log");
        sink.send(&[0u8; 10]).await.unwrap();
        sink.send(&[0u8; 5]).await.unwrap();
        assert_eq!(sink.packets(), 2);
        assert_eq!(sink.name(), "test_log");
    }
}
