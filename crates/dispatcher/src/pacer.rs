//! Pacer - deadline accumulation for rate limiting
//!
//! The deadline only ever moves forward by each packet's transmit time, so
//! a fast write earns slack that later packets spend, and a slow write is
//! never compensated beyond the accumulated deadline.

use std::time::Duration;
use contracts::MIN_BITRATE_KBPS;
use tokio::time::Instant;

/// Next-transmission deadline for a target byte rate
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    byte_rate: f64,
    next_tx: Instant,
}

impl Pacer {
    /// Start pacing at `kbps` from `start`
    ///
    /// Rates below [`MIN_BITRATE_KBPS`] (or NaN) pace at the minimum.
    pub fn new(kbps: f64, start: Instant) -> Self {
        Self {
            byte_rate: kbps.max(MIN_BITRATE_KBPS) * 1000.0 / 8.0,
            next_tx: start,
        }
    }

    /// Target rate in bytes per second
    pub fn byte_rate(&self) -> f64 {
        self.byte_rate
    }

    /// Current deadline
    pub fn deadline(&self) -> Instant {
        self.next_tx
    }

    /// Time needed to send `len` bytes at the target rate, saturating at
    /// `Duration::MAX`
    pub fn transmit_time(&self, len: usize) -> Duration {
        Duration::try_from_secs_f64(len as f64 / self.byte_rate).unwrap_or(Duration::MAX)
    }

    /// Account for a packet of `len` bytes just sent at `now`
    ///
    /// Returns the instant to wait for, or `None` when the deadline has
    /// already passed.
    pub fn advance(&mut self, len: usize, now: Instant) -> Option<Instant> {
        self.next_tx += self.transmit_time(len);
        (self.next_tx > now).then_some(self.next_tx)
    }
}
