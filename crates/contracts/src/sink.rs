//! OutputSink trait - dispatcher output interface

use crate::ContractError;

/// Raw-bytes output target
///
/// All output implementations must implement this trait. No acknowledgement
/// is read back.
#[trait_variant::make(OutputSink: Send)]
pub trait LocalOutputSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one serialized packet
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn send(&mut self, data: &[u8]) -> Result<(), ContractError>;
}
