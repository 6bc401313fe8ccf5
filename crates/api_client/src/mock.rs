//! Mock collaborators
//!
//! Scripted feed sessions and an in-memory order store for tests, with
//! failure injection.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use contracts::{ContractError, FeedConnector, Order, OrderSource};
use futures::stream;
use tracing::instrument;

/// One scripted feed session
#[derive(Debug)]
pub enum MockSession {
    /// Connect succeeds and yields these items, then the stream closes
    Events(Vec<Result<Order, ContractError>>),
    /// Connect fails with this error
    Refused(ContractError),
}

#[derive(Debug, Default)]
struct FeedState {
    sessions: VecDeque<MockSession>,
    connects: usize,
}

/// Mock feed connector
///
/// Plays back its sessions in order. Once they are exhausted every connect
/// fails with a configuration error, which stops a subscription loop.
#[derive(Debug, Clone, Default)]
pub struct MockFeed {
    state: Arc<Mutex<FeedState>>,
}

impl MockFeed {
    /// Create a feed with the given sessions
    pub fn new(sessions: impl IntoIterator<Item = MockSession>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                sessions: sessions.into_iter().collect(),
                connects: 0,
            })),
        }
    }

    /// Number of connect attempts so far
    pub fn connects(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .connects
    }
}

impl FeedConnector for MockFeed {
    type Events = stream::Iter<std::vec::IntoIter<Result<Order, ContractError>>>;

    #[instrument(name = "mock_feed_connect", skip(self))]
    async fn connect(&self) -> Result<Self::Events, ContractError> {
        let next = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.connects += 1;
            state.sessions.pop_front()
        };
        match next {
            Some(MockSession::Events(items)) => Ok(stream::iter(items)),
            Some(MockSession::Refused(err)) => Err(err),
            None => Err(ContractError::config_validation(
                "mock_feed",
                "no scripted sessions left",
            )),
        }
    }
}

#[derive(Debug, Default)]
struct OrderState {
    payloads: HashMap<u32, Bytes>,
    fail_fetch: HashSet<u32>,
    fail_confirm: HashSet<u32>,
    fetched: Vec<u32>,
    confirmed: Vec<(u32, Vec<u8>)>,
}

/// In-memory order store
///
/// Clones share state, so a test can keep a handle after moving one into
/// the engine.
#[derive(Debug, Clone, Default)]
pub struct MockOrderSource {
    state: Arc<Mutex<OrderState>>,
}

impl MockOrderSource {
    /// Empty store: every fetch returns `None`
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OrderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a payload for `seq_num`
    pub fn insert(&self, seq_num: u32, data: impl Into<Bytes>) {
        self.lock().payloads.insert(seq_num, data.into());
    }

    /// Make fetches of `seq_num` fail
    pub fn fail_fetch(&self, seq_num: u32) {
        self.lock().fail_fetch.insert(seq_num);
    }

    /// Make confirmations of `seq_num` fail
    pub fn fail_confirm(&self, seq_num: u32) {
        self.lock().fail_confirm.insert(seq_num);
    }

    /// Sequence numbers fetched, in call order
    pub fn fetched(&self) -> Vec<u32> {
        self.lock().fetched.clone()
    }

    /// Confirmations sent, in call order
    pub fn confirmed(&self) -> Vec<(u32, Vec<u8>)> {
        self.lock().confirmed.clone()
    }
}

impl OrderSource for MockOrderSource {
    async fn fetch_data(&self, seq_num: u32) -> Result<Option<Bytes>, ContractError> {
        let mut state = self.lock();
        state.fetched.push(seq_num);
        if state.fail_fetch.contains(&seq_num) {
            return Err(ContractError::order_fetch(seq_num, "mock fetch failure"));
        }
        Ok(state.payloads.get(&seq_num).cloned())
    }

    async fn confirm_tx(&self, seq_num: u32, regions: &[u8]) -> Result<(), ContractError> {
        let mut state = self.lock();
        if state.fail_confirm.contains(&seq_num) {
            return Err(ContractError::order_confirm(seq_num, "mock confirm failure"));
        }
        state.confirmed.push((seq_num, regions.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn order(seq: u32) -> Order {
        Order {
            status: "transmitting".into(),
            tx_seq_num: seq,
            message_size: 0,
        }
    }

    #[tokio::test]
    async fn test_mock_feed_plays_sessions_in_order() {
        let feed = MockFeed::new([
            MockSession::Refused(ContractError::FeedConnection {
                message: "down".into(),
            }),
            MockSession::Events(vec![Ok(order(1)), Ok(order(2))]),
        ]);

        assert!(feed.connect().await.is_err());
        let events: Vec<_> = feed.connect().await.unwrap().collect().await;
        assert_eq!(events.len(), 2);
        let exhausted = feed.connect().await.err().unwrap();
        assert_eq!(exhausted.retry_policy(), contracts::RetryPolicy::Fatal);
        assert_eq!(feed.connects(), 3);
    }

    #[tokio::test]
    async fn test_mock_order_source_records_calls() {
        let source = MockOrderSource::new();
        source.insert(3, &b"payload"[..]);
        source.fail_confirm(4);

        assert_eq!(
            source.fetch_data(3).await.unwrap(),
            Some(Bytes::from_static(b"payload"))
        );
        assert_eq!(source.fetch_data(5).await.unwrap(), None);
        source.confirm_tx(3, &[0, 1]).await.unwrap();
        assert!(source.confirm_tx(4, &[]).await.is_err());

        assert_eq!(source.fetched(), vec![3, 5]);
        assert_eq!(source.confirmed(), vec![(3, vec![0, 1])]);
    }
}
