use bazaar_core::protocol::MAX_DATAGRAM;
use bazaar_fabric::{
    error::Error, server, server::RECEIVE_ERROR_BACKOFF, DatagramChannel, Exchange,
    ExchangeConfig, Handler,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Replies with the message it received
struct Echo;

#[async_trait::async_trait]
impl Handler for Echo {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        Some(message.to_string())
    }
}

/// Counts deliveries and only answers from the `answer_from`-th one onwards
struct Flaky {
    seen: AtomicUsize,
    answer_from: usize,
}

impl Flaky {
    fn new(answer_from: usize) -> Arc<Self> {
        Arc::new(Self {
            seen: AtomicUsize::new(0),
            answer_from,
        })
    }

    fn silent() -> Arc<Self> {
        Self::new(usize::MAX)
    }

    fn seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Handler for Flaky {
    async fn handle(&self, _message: &str, _from: SocketAddr) -> Option<String> {
        let n = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        (n >= self.answer_from).then(|| format!("reply-{}", n))
    }
}

/// Sleeps before answering `slow`, answers anything else at once
struct Sluggish;

#[async_trait::async_trait]
impl Handler for Sluggish {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        if message == "slow" {
            tokio::time::sleep(Duration::from_millis(400)).await;
        }
        Some(message.to_string())
    }
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

/// Helper to start a handler on a free port
async fn start<H: Handler>(handler: Arc<H>) -> SocketAddr {
    let channel = DatagramChannel::bind_addr(loopback()).await.unwrap();
    let addr = channel.local_addr().unwrap();
    server::spawn(channel, handler);
    addr
}

fn config(max_retries: u32, loss_probability: f64) -> ExchangeConfig {
    ExchangeConfig::new(
        max_retries,
        loss_probability,
        Duration::from_millis(5),
        Duration::from_millis(100),
    )
}

#[tokio::test]
async fn channel_send_receive_single_message() {
    let server = DatagramChannel::bind_addr(loopback()).await.unwrap();
    let client = DatagramChannel::bind_addr(loopback()).await.unwrap();

    client
        .send_to("  LOOKUP Bank \n", server.local_addr().unwrap())
        .await
        .unwrap();
    let (message, from) = server.receive().await.unwrap();

    assert_eq!(message, "LOOKUP Bank");
    assert_eq!(from, client.local_addr().unwrap());
}

#[tokio::test]
async fn channel_skips_undecodable_datagrams() {
    let server = DatagramChannel::bind_addr(loopback()).await.unwrap();
    let addr = server.local_addr().unwrap();

    let raw = tokio::net::UdpSocket::bind(loopback()).await.unwrap();
    raw.send_to(b"   \n", addr).await.unwrap();
    raw.send_to(&[0xff, 0xfe, 0xfd], addr).await.unwrap();
    raw.send_to(b"LIST", addr).await.unwrap();

    let (message, _) = server.receive().await.unwrap();
    assert_eq!(message, "LIST");
}

#[tokio::test]
async fn channel_drops_oversized_datagrams() {
    let server = DatagramChannel::bind_addr(loopback()).await.unwrap();
    let addr = server.local_addr().unwrap();

    // Cut at the size limit this would still read as a valid registration
    let mut oversized = b"REG Bank 4000 localhost".to_vec();
    oversized.resize(MAX_DATAGRAM + 100, b' ');
    oversized.push(b'x');

    let raw = tokio::net::UdpSocket::bind(loopback()).await.unwrap();
    raw.send_to(&oversized, addr).await.unwrap();
    raw.send_to(b"LIST", addr).await.unwrap();

    let (message, _) = server.receive().await.unwrap();
    assert_eq!(message, "LIST");
}

#[tokio::test]
async fn channel_receive_timeout_fires() {
    let channel = DatagramChannel::bind_addr(loopback()).await.unwrap();

    let received = channel
        .receive_timeout(Duration::from_millis(50))
        .await
        .unwrap();
    assert!(received.is_none());
}

#[tokio::test]
async fn binding_a_taken_port_fails() {
    let taken = DatagramChannel::bind_addr(loopback()).await.unwrap();
    let addr = taken.local_addr().unwrap();

    match DatagramChannel::bind_addr(addr).await {
        Err(Error::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
        other => panic!("Expected Bind error, got {:?}", other),
    }
}

#[tokio::test]
async fn exchange_returns_reply() {
    let addr = start(Arc::new(Echo)).await;
    let exchange = Exchange::new(config(3, 0.0)).unwrap();

    let reply = exchange.request(addr, "REQ 42").await.unwrap();
    assert_eq!(reply, "REQ 42");
}

#[tokio::test]
async fn exchange_times_out_after_exactly_max_retries() {
    let peer = Flaky::silent();
    let addr = start(Arc::clone(&peer)).await;
    let exchange = Exchange::new(config(3, 0.0)).unwrap();

    let result = exchange.request(addr, "REQ 42").await;
    match result {
        Err(Error::ExchangeTimeout { attempts }) => assert_eq!(attempts, 3),
        other => panic!("Expected ExchangeTimeout, got {:?}", other),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(peer.seen(), 3);
}

#[tokio::test]
async fn certain_loss_never_reaches_the_peer() {
    let peer = Flaky::new(1);
    let addr = start(Arc::clone(&peer)).await;
    let exchange = Exchange::new(config(2, 1.0)).unwrap();

    let err = exchange.request(addr, "REQ 42").await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(peer.seen(), 0);
}

#[tokio::test]
async fn lost_reply_is_recovered_by_resending() {
    let peer = Flaky::new(2);
    let addr = start(Arc::clone(&peer)).await;
    let exchange = Exchange::new(config(3, 0.0)).unwrap();

    let reply = exchange.request(addr, "REQ 42").await.unwrap();

    // The peer processed the request twice and the reply is to the second
    assert_eq!(reply, "reply-2");
    assert_eq!(peer.seen(), 2);
}

/// First seed whose opening draw drops the send
fn dropping_seed(loss_probability: f64) -> u64 {
    (0u64..)
        .find(|seed| StdRng::seed_from_u64(*seed).gen::<f64>() < loss_probability)
        .unwrap()
}

/// Simulated drops an exchange seeded with `seed` goes through before `sends` sends get out
fn drops_before(seed: u64, loss_probability: f64, sends: usize) -> u32 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut drops = 0;
    for _ in 0..sends {
        while rng.gen::<f64>() < loss_probability {
            drops += 1;
        }
    }
    drops
}

#[tokio::test]
async fn simulated_loss_still_delivers_within_budget() {
    let loss = 0.5;
    let seed = dropping_seed(loss);
    let drops = drops_before(seed, loss, 2);
    assert!(drops >= 1);

    // First delivery goes unanswered, so the reply needs a second attempt
    let peer = Flaky::new(2);
    let addr = start(Arc::clone(&peer)).await;
    let delay = Duration::from_millis(40);
    let timeout = Duration::from_millis(100);
    let exchange =
        Exchange::with_seed(ExchangeConfig::new(4, loss, delay, timeout), seed).unwrap();

    let started = Instant::now();
    let reply = exchange.request(addr, "REQ 42").await.unwrap();

    assert_eq!(reply, "reply-2");
    assert_eq!(peer.seen(), 2);
    assert!(started.elapsed() >= delay * drops + timeout);
}

#[tokio::test]
async fn oversized_request_is_refused() {
    let peer = Flaky::new(1);
    let addr = start(Arc::clone(&peer)).await;
    let exchange = Exchange::new(config(1, 0.0)).unwrap();

    let message = "x".repeat(MAX_DATAGRAM + 1);
    match exchange.request(addr, &message).await {
        Err(Error::PayloadTooLarge(len)) => assert_eq!(len, MAX_DATAGRAM + 1),
        other => panic!("Expected PayloadTooLarge, got {:?}", other),
    }
    assert_eq!(peer.seen(), 0);
}

#[tokio::test]
async fn server_handles_datagrams_concurrently() {
    let addr = start(Arc::new(Sluggish)).await;
    let exchange = Arc::new(Exchange::new(ExchangeConfig::new(
        1,
        0.0,
        Duration::from_millis(5),
        Duration::from_secs(2),
    ))
    .unwrap());

    let slow = {
        let exchange = Arc::clone(&exchange);
        tokio::spawn(async move { exchange.request(addr, "slow").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let started = Instant::now();
    let fast = exchange.request(addr, "fast").await.unwrap();
    assert_eq!(fast, "fast");
    assert!(started.elapsed() < Duration::from_millis(300));

    assert_eq!(slow.await.unwrap().unwrap(), "slow");
}

#[tokio::test]
async fn server_keeps_serving_after_a_peer_vanishes() {
    let addr = start(Arc::new(Echo)).await;
    {
        let gone = tokio::net::UdpSocket::bind(loopback()).await.unwrap();
        gone.send_to(b"REQ 1", addr).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A failed read only pauses the loop, well inside one receive timeout
    let exchange = Exchange::new(config(1, 0.0)).unwrap();
    assert!(RECEIVE_ERROR_BACKOFF < exchange.config().receive_timeout());
    assert_eq!(exchange.request(addr, "REQ 2").await.unwrap(), "REQ 2");
}

#[test]
fn config_rejects_out_of_range_values() {
    assert!(matches!(
        config(0, 0.0).validate(),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        config(3, 1.5).validate(),
        Err(Error::InvalidConfig(_))
    ));
    assert!(Exchange::new(config(3, -0.1)).is_err());
    assert!(config(3, 1.0).validate().is_ok());
}

#[test]
fn presets_match_the_service_and_client_budgets() {
    let service = ExchangeConfig::service();
    assert_eq!(service.max_retries, 3);
    assert_eq!(service.receive_timeout(), Duration::from_millis(500));
    assert_eq!(service.worst_case(), Duration::from_millis(1800));

    let client = ExchangeConfig::client().with_loss_probability(0.0);
    assert_eq!(client.max_retries, 5);
    assert_eq!(client.loss_probability, 0.0);
    assert_eq!(client.receive_timeout(), Duration::from_millis(1000));
}
