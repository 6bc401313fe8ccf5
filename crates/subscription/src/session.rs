//! Subscription loop and session outcomes.

use std::time::Duration;

use contracts::{ContractError, FeedConnector, OrderHandler, RetryPolicy, ServerConfig};
use futures::StreamExt;
use tracing::{debug, error, info, instrument, warn};

/// Consecutive empty clean closes after which reconnects are delayed
const IDLE_CLOSES_BEFORE_BACKOFF: u32 = 2;

/// How one feed session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// Server closed the stream after this many feed items
    Closed { events: usize },
    /// Transient stream failure; reconnect at once
    Retry(ContractError),
    /// Reconnect after the delay
    Backoff(ContractError),
    /// Stop subscribing
    Fatal(ContractError),
}

impl SessionOutcome {
    /// Classify a feed error by its retry policy
    pub fn from_feed_error(err: ContractError) -> Self {
        match err.retry_policy() {
            RetryPolicy::Immediate => Self::Retry(err),
            RetryPolicy::Backoff => Self::Backoff(err),
            RetryPolicy::Fatal => Self::Fatal(err),
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Closed { events: 0 } => "idle",
            Self::Closed { .. } => "closed",
            Self::Retry(_) => "stream",
            Self::Backoff(_) => "backoff",
            Self::Fatal(_) => "fatal",
        }
    }
}

/// Reconnecting feed subscription
pub struct Subscription<C> {
    connector: C,
    reconnect_delay: Duration,
}

impl<C> Subscription<C>
where
    C: FeedConnector + Sync,
{
    pub fn new(connector: C, reconnect_delay: Duration) -> Self {
        Self {
            connector,
            reconnect_delay,
        }
    }

    /// Subscription using `[server]` reconnect settings
    pub fn from_config(connector: C, config: &ServerConfig) -> Self {
        Self::new(connector, Duration::from_millis(config.reconnect_delay_ms))
    }

    /// Connect once and deliver events until the session ends
    ///
    /// Malformed events are logged and skipped. A handler error ends the
    /// session with [`SessionOutcome::Backoff`].
    #[instrument(name = "subscription_session", skip(self, handler))]
    pub async fn run_session<H: OrderHandler>(&self, handler: &mut H) -> SessionOutcome {
        let mut events = match self.connector.connect().await {
            Ok(events) => events,
            Err(err) => return SessionOutcome::from_feed_error(err),
        };
        info!("Connected. Waiting for events...");

        let mut received = 0;
        while let Some(item) = events.next().await {
            received += 1;
            match item {
                Ok(order) => {
                    debug!(status = %order.status, tx_seq_num = order.tx_seq_num, "Event");
                    if let Err(err) = handler.handle(order).await {
                        return SessionOutcome::Backoff(err);
                    }
                }
                Err(ContractError::MalformedEvent { message }) => {
                    warn!(error = %message, "Skipping malformed event");
                }
                Err(err) => return SessionOutcome::from_feed_error(err),
            }
        }
        SessionOutcome::Closed { events: received }
    }

    /// Subscribe until a fatal error
    ///
    /// A clean close reconnects at once, unless it is the second or later
    /// in a row to deliver nothing; those wait the reconnect delay.
    ///
    /// # Errors
    /// Returns the error of the first session that ends fatally
    #[instrument(
        name = "subscription_run",
        skip(self, handler),
        fields(reconnect_delay_ms = self.reconnect_delay.as_millis() as u64)
    )]
    pub async fn run<H: OrderHandler>(&self, handler: &mut H) -> Result<(), ContractError> {
        let mut idle_closes = 0u32;
        loop {
            let outcome = self.run_session(handler).await;
            let reason = outcome.reason();
            if matches!(outcome, SessionOutcome::Closed { events: 0 }) {
                idle_closes += 1;
            } else {
                idle_closes = 0;
            }
            match outcome {
                SessionOutcome::Closed { events } => {
                    info!(events, "Feed closed by server");
                    if idle_closes >= IDLE_CLOSES_BEFORE_BACKOFF {
                        warn!(
                            idle_closes,
                            delay_ms = self.reconnect_delay.as_millis() as u64,
                            "Feed keeps closing without events"
                        );
                        tokio::time::sleep(self.reconnect_delay).await;
                    }
                }
                SessionOutcome::Retry(err) => debug!(error = %err, "Feed stream interrupted"),
                SessionOutcome::Backoff(err) => {
                    warn!(
                        error = %err,
                        delay_ms = self.reconnect_delay.as_millis() as u64,
                        "Feed session failed"
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                }
                SessionOutcome::Fatal(err) => {
                    error!(error = %err, "Giving up on feed");
                    return Err(err);
                }
            }
            observability::record_reconnect(reason);
            info!("Reconnecting...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{MockFeed, MockSession};
    use contracts::Order;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_secs(2);

    #[derive(Default)]
    struct Recorder {
        seen: Vec<u32>,
        fail_on: Option<u32>,
    }

    impl OrderHandler for Recorder {
        async fn handle(&mut self, order: Order) -> Result<(), ContractError> {
            self.seen.push(order.tx_seq_num);
            if self.fail_on == Some(order.tx_seq_num) {
                return Err(ContractError::order_fetch(order.tx_seq_num, "boom"));
            }
            Ok(())
        }
    }

    fn order(seq: u32) -> Result<Order, ContractError> {
        Ok(Order {
            status: "transmitting".to_string(),
            tx_seq_num: seq,
            message_size: 0,
        })
    }

    fn refused() -> MockSession {
        MockSession::Refused(ContractError::FeedConnection {
            message: "connection refused".into(),
        })
    }

    #[tokio::test]
    async fn test_session_delivers_events_in_order() {
        let feed = MockFeed::new([MockSession::Events(vec![order(1), order(2), order(3)])]);
        let sub = Subscription::new(feed, DELAY);
        let mut handler = Recorder::default();

        let outcome = sub.run_session(&mut handler).await;

        assert!(matches!(outcome, SessionOutcome::Closed { events: 3 }));
        assert_eq!(handler.seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_malformed_event_is_skipped() {
        let feed = MockFeed::new([MockSession::Events(vec![
            order(1),
            Err(ContractError::MalformedEvent {
                message: "expected value".into(),
            }),
            order(2),
        ])]);
        let sub = Subscription::new(feed, DELAY);
        let mut handler = Recorder::default();

        let outcome = sub.run_session(&mut handler).await;

        assert!(matches!(outcome, SessionOutcome::Closed { .. }));
        assert_eq!(handler.seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_stream_error_ends_session_for_retry() {
        let feed = MockFeed::new([MockSession::Events(vec![
            order(1),
            Err(ContractError::FeedStream {
                message: "unexpected EOF".into(),
            }),
            order(2),
        ])]);
        let sub = Subscription::new(feed, DELAY);
        let mut handler = Recorder::default();

        let outcome = sub.run_session(&mut handler).await;

        assert!(matches!(outcome, SessionOutcome::Retry(_)));
        assert_eq!(handler.seen, vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_and_interrupted_sessions_reconnect_immediately() {
        let feed = MockFeed::new([
            MockSession::Events(vec![order(1)]),
            MockSession::Events(vec![
                order(2),
                Err(ContractError::FeedStream {
                    message: "decode".into(),
                }),
            ]),
            MockSession::Events(vec![order(3)]),
        ]);
        let sub = Subscription::new(feed.clone(), DELAY);
        let mut handler = Recorder::default();
        let start = Instant::now();

        let err = sub.run(&mut handler).await.unwrap_err();

        assert_eq!(err.retry_policy(), RetryPolicy::Fatal);
        assert_eq!(handler.seen, vec![1, 2, 3]);
        assert_eq!(feed.connects(), 4);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failure_waits_before_retry() {
        let feed = MockFeed::new([refused(), refused(), MockSession::Events(vec![order(7)])]);
        let sub = Subscription::new(feed.clone(), DELAY);
        let mut handler = Recorder::default();
        let start = Instant::now();

        sub.run(&mut handler).await.unwrap_err();

        assert_eq!(handler.seen, vec![7]);
        assert_eq!(start.elapsed(), DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_failure_backs_off() {
        let feed = MockFeed::new([
            MockSession::Events(vec![order(1), order(2), order(3)]),
            MockSession::Events(vec![order(4)]),
        ]);
        let sub = Subscription::new(feed, DELAY);
        let mut handler = Recorder {
            fail_on: Some(2),
            ..Default::default()
        };
        let start = Instant::now();

        sub.run(&mut handler).await.unwrap_err();

        assert_eq!(handler.seen, vec![1, 2, 4]);
        assert_eq!(start.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_empty_closes_back_off() {
        let feed = MockFeed::new([
            MockSession::Events(vec![]),
            MockSession::Events(vec![]),
            MockSession::Events(vec![]),
            MockSession::Events(vec![order(9)]),
            MockSession::Events(vec![]),
        ]);
        let sub = Subscription::new(feed.clone(), DELAY);
        let mut handler = Recorder::default();
        let start = Instant::now();

        sub.run(&mut handler).await.unwrap_err();

        assert_eq!(handler.seen, vec![9]);
        assert_eq!(feed.connects(), 6);
        assert_eq!(start.elapsed(), DELAY * 2);
    }

    #[test]
    fn test_outcome_follows_retry_policy() {
        let outcome = SessionOutcome::from_feed_error(ContractError::config_validation("server.url", "bad"));
        assert!(matches!(outcome, SessionOutcome::Fatal(_)));
        let outcome = SessionOutcome::from_feed_error(ContractError::FeedRequest {
            message: "HTTP 500".into(),
        });
        assert!(matches!(outcome, SessionOutcome::Backoff(_)));
    }
}
