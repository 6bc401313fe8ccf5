//! RateLimitedDispatcher - paced fan-out of link packets

use std::time::Duration;

use contracts::{LinkPacket, OutputSink, MIN_BITRATE_KBPS};
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

use crate::error::DispatcherError;
use crate::pacer::Pacer;

/// Outcome of one dispatch call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DispatchStats {
    /// Packets sent (each to every target)
    pub packets: usize,
    /// Bytes sent per target
    pub bytes: usize,
    /// Wall-clock duration of the call
    pub elapsed: Duration,
}

impl DispatchStats {
    /// Achieved rate in kbps
    pub fn kbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 * 8.0 / secs / 1000.0
        } else {
            0.0
        }
    }
}

/// Sends packets to all targets at a fixed bit rate
#[derive(Debug, Clone, Copy)]
pub struct RateLimitedDispatcher {
    bitrate_kbps: f64,
}

impl RateLimitedDispatcher {
    /// Create a dispatcher for `bitrate_kbps`
    ///
    /// # Errors
    /// Returns `InvalidBitrate` unless the rate is finite and at least
    /// [`MIN_BITRATE_KBPS`]
    pub fn new(bitrate_kbps: f64) -> Result<Self, DispatcherError> {
        if !bitrate_kbps.is_finite() || bitrate_kbps < MIN_BITRATE_KBPS {
            return Err(DispatcherError::InvalidBitrate(bitrate_kbps));
        }
        Ok(Self { bitrate_kbps })
    }

    /// Target bit rate
    pub fn bitrate_kbps(&self) -> f64 {
        self.bitrate_kbps
    }

    /// Time `bytes` take at the target rate, saturating at `Duration::MAX`
    pub fn expected_duration(&self, bytes: usize) -> Duration {
        Duration::try_from_secs_f64(bytes as f64 * 8.0 / (self.bitrate_kbps * 1000.0))
            .unwrap_or(Duration::MAX)
    }

    /// Write every packet to every target, pacing to the target rate
    ///
    /// Each packet goes to all targets before the next one is considered.
    ///
    /// # Errors
    /// Stops at the first failed write and returns it
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, packets, targets),
        fields(packets = packets.len(), targets = targets.len())
    )]
    pub async fn dispatch<P, S>(
        &self,
        packets: &[P],
        targets: &mut [S],
    ) -> Result<DispatchStats, DispatcherError>
    where
        P: LinkPacket + Sync,
        S: OutputSink,
    {
        let start = Instant::now();
        let mut pacer = Pacer::new(self.bitrate_kbps, start);
        let mut stats = DispatchStats::default();

        for (i, packet) in packets.iter().enumerate() {
            let raw = packet.pack();
            for target in targets.iter_mut() {
                target.send(&raw).await?;
                trace!(sink = target.name(), packet = i, bytes = raw.len(), "Sent packet");
            }
            stats.packets += 1;
            stats.bytes += raw.len();

            if let Some(deadline) = pacer.advance(raw.len(), Instant::now()) {
                tokio::time::sleep_until(deadline).await;
            }
        }

        stats.elapsed = start.elapsed();
        observability::record_packets_sent(stats.packets, stats.bytes, targets.len());
        debug!(
            packets = stats.packets,
            bytes = stats.bytes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            kbps = format!("{:.1}", stats.kbps()),
            "Dispatch complete"
        );
        Ok(stats)
    }
}
