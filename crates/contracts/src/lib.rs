//! # Contracts
//!
//! Interface contracts shared by every demo-rx crate: the order model, the
//! sequence-number arithmetic, the collaborator traits and the configuration
//! surface. Business crates depend on this crate only, never on each other's
//! internals.
//!
//! ## Sequence Model
//! - Transmission sequence numbers live in `[0, 2^31)` and wrap
//! - Ordering between two numbers is decided by forward modular distance

mod config;
mod error;
mod order;
mod packet;
mod seq;
mod sink;
mod source;

pub use config::*;
pub use error::*;
pub use order::*;
pub use packet::*;
pub use seq::*;
pub use sink::*;
pub use source::*;
