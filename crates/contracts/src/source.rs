//! Server-side collaborator interfaces: event feed and order retrieval.

use bytes::Bytes;
use futures::Stream;

use crate::{ContractError, Order};

/// Opens sessions on the live order feed
#[trait_variant::make(FeedConnector: Send)]
pub trait LocalFeedConnector {
    /// Events of one session, in arrival order
    type Events: Stream<Item = Result<Order, ContractError>> + Send + Unpin;

    /// Open a fresh session
    ///
    /// # Errors
    /// Returns connection or request errors; see [`ContractError::retry_policy`]
    async fn connect(&self) -> Result<Self::Events, ContractError>;
}

/// Order payload retrieval and transmission confirmation
#[trait_variant::make(OrderSource: Send)]
pub trait LocalOrderSource {
    /// Fetch the payload for `seq_num`
    ///
    /// `Ok(None)` means the server has no payload for this number.
    async fn fetch_data(&self, seq_num: u32) -> Result<Option<Bytes>, ContractError>;

    /// Tell the server that `seq_num` has been transmitted over `regions`
    async fn confirm_tx(&self, seq_num: u32, regions: &[u8]) -> Result<(), ContractError>;
}

/// Consumer of feed events
#[trait_variant::make(OrderHandler: Send)]
pub trait LocalOrderHandler {
    /// Handle one order event to completion
    async fn handle(&mut self, order: Order) -> Result<(), ContractError>;
}
