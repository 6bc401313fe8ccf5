//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Configuration to live receiver assembly
//! - Mock feed -> catch-up -> paced UDP output -> reassembly
//! - Aggregate pacing over several events

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_config_survives_toml_round_trip() {
        let config = ConfigLoader::load_from_str(
            r#"
[transmission]
regions = [0, 3]

[[sinks]]
name = "log"
sink_type = "log"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        let toml = ConfigLoader::to_toml(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(reloaded.server.url, "https://api.blockstream.space");
        assert_eq!(reloaded.transmission.regions, vec![0, 3]);
        assert_eq!(reloaded.sinks.len(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use api_client::{MockFeed, MockOrderSource, MockSession};
    use bytes::Bytes;
    use catch_up::{CatchUpEngine, EngineConfig, TrackedReceiver};
    use contracts::{ContractError, Order, SinkConfig, SinkType};
    use dispatcher::{LogSink, RateLimitedDispatcher};
    use link_packet::{BlocksatPacket, PacketSplitter, Reassembler};
    use subscription::Subscription;
    use tokio::net::UdpSocket;
    use tokio::time::{timeout, Instant};

    fn event(status: &str, seq: u32) -> Result<Order, ContractError> {
        Ok(Order {
            status: status.to_string(),
            tx_seq_num: seq,
            message_size: 0,
        })
    }

    fn payload(seq: u32, len: usize) -> Bytes {
        (0..len).map(|i| (i as u32 ^ seq) as u8).collect()
    }

    /// End-to-end: MockFeed -> Subscription -> CatchUpEngine -> UdpSink
    ///
    /// Exercises catch-up, an ignored status, an empty order, a duplicate,
    /// a malformed event and a rollback across two feed sessions, then
    /// reassembles what arrived on the wire.
    #[tokio::test]
    async fn test_e2e_feed_to_udp() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sink_configs = vec![SinkConfig {
            name: "udp".to_string(),
            sink_type: SinkType::Udp,
            params: HashMap::from([(
                "addr".to_string(),
                listener.local_addr().unwrap().to_string(),
            )]),
        }];
        let targets = dispatcher::create_targets(&sink_configs).await.unwrap();

        let source = MockOrderSource::new();
        source.insert(1, payload(1, 100));
        source.insert(2, payload(2, 3000));
        source.insert(4, payload(4, 5000));

        let feed = MockFeed::new([
            MockSession::Events(vec![
                event("transmitting", 1),
                event("pending", 2),
                event("transmitting", 4),
            ]),
            MockSession::Events(vec![
                event("transmitting", 4),
                Err(ContractError::MalformedEvent {
                    message: "trailing characters".into(),
                }),
                event("transmitting", 2),
            ]),
        ]);

        let engine = CatchUpEngine::new(
            EngineConfig {
                trigger_status: "transmitting".to_string(),
                channel: 5,
                regions: vec![1, 2],
            },
            source.clone(),
            PacketSplitter::new(),
            RateLimitedDispatcher::new(100_000.0).unwrap(),
            targets,
        );
        let mut receiver = TrackedReceiver::new(engine);
        let subscription = Subscription::new(feed.clone(), Duration::from_millis(10));

        let err = subscription.run(&mut receiver).await.unwrap_err();
        assert_eq!(err.retry_policy(), contracts::RetryPolicy::Fatal);
        assert_eq!(feed.connects(), 3);

        assert_eq!(source.fetched(), vec![1, 2, 3, 4, 2]);
        assert_eq!(
            source.confirmed(),
            vec![(1, vec![1, 2]), (2, vec![1, 2]), (4, vec![1, 2]), (2, vec![1, 2])]
        );
        assert_eq!(receiver.state().last_seq_num(), Some(2));

        let stats = receiver.engine().stats();
        assert_eq!(stats.events, 5);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.rollbacks, 1);
        assert_eq!(stats.empty_orders, 1);
        assert_eq!(stats.transmitted, 4);

        let mut reassembler = Reassembler::new().with_channel(5);
        let mut messages = Vec::new();
        let mut buf = [0u8; 2048];
        while messages.len() < 4 {
            let len = timeout(Duration::from_secs(1), listener.recv(&mut buf))
                .await
                .expect("datagram within a second")
                .unwrap();
            let packet = BlocksatPacket::unpack(Bytes::copy_from_slice(&buf[..len])).unwrap();
            if let Some(message) = reassembler.push(packet) {
                messages.push(message);
            }
        }

        assert_eq!(
            messages,
            vec![
                (1, payload(1, 100)),
                (2, payload(2, 3000)),
                (4, payload(4, 5000)),
                (2, payload(2, 3000)),
            ]
        );
    }

    /// Back-to-back events converge to the configured rate
    #[tokio::test(start_paused = true)]
    async fn test_aggregate_rate_over_events() {
        let source = MockOrderSource::new();
        for seq in 10..16 {
            source.insert(seq, payload(seq, 4000 + seq as usize * 100));
        }
        let feed = MockFeed::new([MockSession::Events(
            (10..16).map(|seq| event("transmitting", seq)).collect(),
        )]);

        let rate = RateLimitedDispatcher::new(64.0).unwrap();
        let engine = CatchUpEngine::new(
            EngineConfig {
                trigger_status: "transmitting".to_string(),
                channel: 1,
                regions: vec![],
            },
            source,
            PacketSplitter::new(),
            rate,
            vec![LogSink::new("log")],
        );
        let mut receiver = TrackedReceiver::new(engine);
        let subscription = Subscription::new(feed, Duration::from_secs(2));

        let start = Instant::now();
        subscription.run(&mut receiver).await.unwrap_err();
        let elapsed = start.elapsed();

        let stats = receiver.engine().stats();
        assert_eq!(stats.transmitted, 6);
        let expected = rate.expected_duration(stats.bytes as usize);
        let drift = elapsed.abs_diff(expected);
        assert!(
            drift < Duration::from_millis(10),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }
}
