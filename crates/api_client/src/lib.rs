//! # API Client
//!
//! Satellite API server access.
//!
//! Responsibilities:
//! - Subscribe to the transmission event feed (server-sent events)
//! - Fetch message payloads by sequence number
//! - Confirm transmissions
//! - Provide scripted mocks of both collaborators for tests

pub mod client;
pub mod error;
pub mod mock;
pub mod sse;

pub use client::ApiClient;
pub use contracts::{FeedConnector, Order, OrderSource};
pub use error::ApiClientError;
pub use mock::{MockFeed, MockOrderSource, MockSession};
pub use sse::{order_events, OrderStream, SseDecoder, SseEvent};
