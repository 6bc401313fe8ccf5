//! # Dispatcher
//!
//! Rate-limited packet output.
//!
//! Responsibilities:
//! - Write every packet of a message to every output target, in order
//! - Pace writes so the aggregate rate converges to the target bit rate
//! - Build output targets (UDP, file, log) from configuration

pub mod dispatcher;
pub mod error;
pub mod pacer;
pub mod sinks;

pub use contracts::{LinkPacket, OutputSink};
pub use dispatcher::{DispatchStats, RateLimitedDispatcher};
pub use error::DispatcherError;
pub use pacer::Pacer;
pub use sinks::{create_targets, FileSink, LogSink, OutputTarget, UdpSink};
