//! # Catch-Up Engine
//!
//! Sequence tracking and transmission replay.
//!
//! Responsibilities:
//! - Decide whether a feed event triggers a transmission
//! - Detect sequence gaps, restarts and duplicates
//! - Fetch, fragment, dispatch and confirm every needed sequence number,
//!   strictly in order
//!
//! Sequence state is an explicit [`SequenceState`] value: the engine takes
//! it in and hands the updated one back, so the tracking logic can be
//! exercised without any I/O.

mod engine;
mod error;
mod receiver;
mod state;

pub use engine::{CatchUpEngine, EngineConfig};
pub use error::CatchUpError;
pub use receiver::TrackedReceiver;
pub use state::{Announcement, CatchUpPlan, SequenceState, Step};
