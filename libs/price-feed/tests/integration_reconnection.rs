//! Integration tests for reconnection behavior

mod common;

use common::{trade_frame, wait_until, AfterScript, MockTradeServer};
use price_feed::transport::{self, ClientEvent};
use price_feed::{
    ExponentialBackoff, FeedConfig, FixedDelay, NeverReconnect, PriceFeed, ReconnectConfig,
    ReconnectionStrategy, TradeDecoder,
};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_exponential_backoff_full_sequence() {
    verbose_println!("Testing exponential backoff full sequence...");

    let strategy = ExponentialBackoff::new(
        Duration::from_millis(100),
        Duration::from_secs(10),
        Some(5),
    );

    let expected_delays = [100, 200, 400, 800, 1600];
    for (attempt, &expected_ms) in expected_delays.iter().enumerate() {
        let delay = strategy.next_delay(attempt).unwrap();
        verbose_println!("  Attempt {}: {:?}", attempt, delay);
        assert_eq!(delay.as_millis(), expected_ms, "attempt {}", attempt);
    }

    assert!(strategy.next_delay(5).is_none());
}

#[test]
fn test_fixed_delay_and_never() {
    let fixed = FixedDelay::new(Duration::from_millis(250), Some(2));
    assert_eq!(fixed.next_delay(0), Some(Duration::from_millis(250)));
    assert_eq!(fixed.next_delay(1), Some(Duration::from_millis(250)));
    assert_eq!(fixed.next_delay(2), None);

    assert!(NeverReconnect.next_delay(0).is_none());
    assert!(!NeverReconnect.should_reconnect(0));
}

#[tokio::test]
async fn test_feed_reconnects_after_server_close() {
    verbose_println!("Testing feed reconnects after the server closes...");

    let server = MockTradeServer::start(vec![trade_frame("50000")], AfterScript::Close).await;
    let config = FeedConfig {
        endpoint: server.endpoint(),
        reconnect: ReconnectConfig {
            enabled: true,
            initial_delay_ms: 20,
            max_delay_ms: 50,
            max_attempts: None,
        },
        ..FeedConfig::default()
    };

    let feed = PriceFeed::connect(&config).await.unwrap();
    let handle = feed.handle();

    assert!(wait_until(TIMEOUT, || server.connection_count() >= 3).await);
    assert!(wait_until(TIMEOUT, || handle.status().reconnects >= 2).await);

    let status = feed.status();
    verbose_println!("  Status after reconnects: {:?}", status);
    assert!(status.samples_published >= 2);
    assert_eq!(feed.latest().value.to_string(), "50000.00");

    feed.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_stops_when_strategy_exhausted() {
    verbose_println!("Testing client gives up after max attempts...");

    // Accepts and closes without data, so the attempt counter never resets

    let server = MockTradeServer::start(vec![], AfterScript::Close).await;
    let client = transport::builder()
        .url(server.endpoint())
        .decoder(TradeDecoder)
        .reconnect_strategy(FixedDelay::new(Duration::from_millis(10), Some(2)))
        .build()
        .await
        .unwrap();

    let events = client.events();

    // Disconnects once the I/O task exits
    let collected = tokio::task::spawn_blocking(move || {
        let (mut connects, mut reconnects) = (0, 0);
        for event in events.iter() {
            match event {
                ClientEvent::Connected => connects += 1,
                ClientEvent::Reconnecting(_) => reconnects += 1,
                _ => {}
            }
        }
        (connects, reconnects)
    });

    let (connects, reconnects) = tokio::time::timeout(TIMEOUT, collected)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(connects, 3);
    assert_eq!(reconnects, 2);
    assert_eq!(server.connection_count(), 3);

    client.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_delivering_connection_resets_attempts() {
    verbose_println!("Testing a connection that delivered data resets the backoff...");

    let server = MockTradeServer::start(vec![trade_frame("50000")], AfterScript::Close).await;
    let client = transport::builder()
        .url(server.endpoint())
        .decoder(TradeDecoder)
        .reconnect_strategy(FixedDelay::new(Duration::from_millis(10), Some(2)))
        .build()
        .await
        .unwrap();

    // Two attempts would stop at three connections without the reset
    assert!(wait_until(TIMEOUT, || server.connection_count() >= 5).await);
    assert!(client.metrics().reconnect_count >= 4);

    client.shutdown().await.unwrap();
}
