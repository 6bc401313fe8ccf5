//! # Subscription
//!
//! Long-lived transmission feed subscription.
//!
//! Responsibilities:
//! - Keep a feed session open, reconnecting on failure
//! - Hand every order event to the handler in arrival order
//! - Classify session endings into retry decisions
//!
//! ## Reconnect Policy
//!
//! | Session ended by                  | Action                  |
//! |-----------------------------------|-------------------------|
//! | server closing the stream         | reconnect immediately   |
//! | repeated close with no events     | wait, then reconnect    |
//! | stream decoding failure           | reconnect immediately   |
//! | connection / request failure      | wait, then reconnect    |
//! | handler failure                   | wait, then reconnect    |
//! | configuration failure             | stop with the error     |

mod session;

pub use session::{SessionOutcome, Subscription};
