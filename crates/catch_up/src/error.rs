//! Catch-up error types

use contracts::ContractError;
use thiserror::Error;

use crate::state::SequenceState;

/// A sequence number failed mid-event
///
/// Carries the state reached before the failure; the failed number counts
/// as consumed.
#[derive(Debug, Error)]
#[error("transmission of seq {seq_num} failed: {source}")]
pub struct CatchUpError {
    /// Sequence number being processed
    pub seq_num: u32,
    /// State to resume from
    pub state: SequenceState,
    /// Underlying failure
    #[source]
    pub source: ContractError,
}

impl From<CatchUpError> for ContractError {
    fn from(err: CatchUpError) -> Self {
        err.source
    }
}
