//! Receiver metrics
//!
//! Prometheus-facing counters plus an in-memory aggregate for the exit
//! summary.

use metrics::{counter, gauge};

/// Record packets written by one dispatch call
pub fn record_packets_sent(packets: usize, bytes: usize, targets: usize) {
    counter!("demo_rx_packets_sent_total").increment((packets * targets) as u64);
    counter!("demo_rx_bytes_sent_total").increment((bytes * targets) as u64);
}

/// Record a processed sequence number
///
/// `catch_up` marks iterations that fill a gap rather than serve the
/// announced number itself.
pub fn record_sequence_processed(seq_num: u32, catch_up: bool) {
    counter!("demo_rx_sequences_processed_total").increment(1);
    if catch_up {
        counter!("demo_rx_catch_up_total").increment(1);
    }
    gauge!("demo_rx_last_seq_num").set(f64::from(seq_num));
}

/// Record a sequence with no payload on the server
pub fn record_empty_order() {
    counter!("demo_rx_empty_orders_total").increment(1);
}

/// Record a detected sequence restart
pub fn record_rollback() {
    counter!("demo_rx_rollbacks_total").increment(1);
}

/// Record a feed reconnect, labelled by cause
pub fn record_reconnect(reason: &'static str) {
    counter!("demo_rx_reconnects_total", "reason" => reason).increment(1);
}

/// In-memory receiver statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Feed events seen
    pub events: u64,
    /// Events whose status was not the trigger
    pub ignored: u64,
    /// Duplicate announcements of the last sequence number
    pub duplicates: u64,
    /// Sequence numbers processed (fetched)
    pub sequences: u64,
    /// Of which were gap catch-up iterations
    pub catch_up: u64,
    /// Sequence restarts detected
    pub rollbacks: u64,
    /// Sequence numbers with no payload
    pub empty_orders: u64,
    /// Messages transmitted and confirmed
    pub transmitted: u64,
    /// Packets sent (per target)
    pub packets: u64,
    /// Bytes sent (per target)
    pub bytes: u64,
}

impl ReceiverStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a one-screen summary
    pub fn print_summary(&self) {
        println!("\n=== Receiver Statistics ===\n");
        println!("  Events:            {}", self.events);
        println!("  Ignored events:    {}", self.ignored);
        println!("  Duplicate events:  {}", self.duplicates);
        println!("  Sequences:         {}", self.sequences);
        println!("  Catch-up:          {}", self.catch_up);
        println!("  Rollbacks:         {}", self.rollbacks);
        println!("  Empty orders:      {}", self.empty_orders);
        println!("  Transmitted:       {}", self.transmitted);
        println!("  Packets sent:      {}", self.packets);
        println!("  Bytes sent:        {}", self.bytes);
        println!();
    }
}
