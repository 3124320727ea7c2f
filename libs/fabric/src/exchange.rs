//! Reliable request/reply over the lossy datagram transport
//!
//! Every exchange opens its own ephemeral socket, sends the request and waits
//! for one reply, resending the same request after each receive timeout until
//! the retry budget is spent. There is no request identifier: a peer can see
//! the same request more than once and must answer it the same way each time.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::DatagramChannel;
use crate::error::{Error, Result};

/// Retry and fault-injection parameters for an [`Exchange`]
///
/// There is deliberately no `Default`; pick [`ExchangeConfig::service`],
/// [`ExchangeConfig::client`] or build one with [`ExchangeConfig::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Send/receive cycles before giving up
    pub max_retries: u32,
    /// Chance that a send is dropped before it reaches the socket
    pub loss_probability: f64,
    /// Pause after a simulated loss before trying to send again
    pub inter_send_delay_ms: u64,
    /// How long each attempt waits for a reply
    pub receive_timeout_ms: u64,
}

impl ExchangeConfig {
    /// Loss rate the services were originally run with
    pub const DEFAULT_LOSS_PROBABILITY: f64 = 0.5;

    pub fn new(
        max_retries: u32,
        loss_probability: f64,
        inter_send_delay: Duration,
        receive_timeout: Duration,
    ) -> Self {
        Self {
            max_retries,
            loss_probability,
            inter_send_delay_ms: inter_send_delay.as_millis() as u64,
            receive_timeout_ms: receive_timeout.as_millis() as u64,
        }
    }

    /// Budget used between services and towards the directory
    pub fn service() -> Self {
        Self::new(
            3,
            Self::DEFAULT_LOSS_PROBABILITY,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
    }

    /// Budget used by the shopper client towards the store
    pub fn client() -> Self {
        Self::new(
            5,
            Self::DEFAULT_LOSS_PROBABILITY,
            Duration::from_millis(100),
            Duration::from_millis(1000),
        )
    }

    pub fn with_loss_probability(mut self, loss_probability: f64) -> Self {
        self.loss_probability = loss_probability;
        self
    }

    pub fn inter_send_delay(&self) -> Duration {
        Duration::from_millis(self.inter_send_delay_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Upper bound on how long one exchange can take
    pub fn worst_case(&self) -> Duration {
        (self.receive_timeout() + self.inter_send_delay()) * self.max_retries
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::InvalidConfig("max_retries must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(Error::InvalidConfig(format!(
                "loss_probability {} outside [0, 1]",
                self.loss_probability
            )));
        }
        if self.receive_timeout_ms == 0 {
            return Err(Error::InvalidConfig("receive_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Send-with-retry client for one request at a time
///
/// Safe to share between tasks; each [`Exchange::request`] uses its own socket.
#[derive(Debug)]
pub struct Exchange {
    config: ExchangeConfig,
    rng: Mutex<StdRng>,
}

impl Exchange {
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create with a fixed loss-simulation seed
    pub fn with_seed(config: ExchangeConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ExchangeConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Send `message` to `dest` and return the first reply
    ///
    /// Fails with [`Error::ExchangeTimeout`] once every attempt's receive has
    /// timed out.
    pub async fn request(&self, dest: SocketAddr, message: &str) -> Result<String> {
        let channel = DatagramChannel::ephemeral().await?;
        let payload = channel.codec().encode(message)?;
        let max_retries = self.config.max_retries;

        for attempt in 1..=max_retries {
            self.transmit(&channel, &payload, dest, attempt).await?;

            debug!(peer = %dest, attempt, max_retries, "awaiting reply");
            match channel.receive_timeout(self.config.receive_timeout()).await {
                Ok(Some((reply, _))) => {
                    debug!(peer = %dest, attempt, "reply received");
                    return Ok(reply);
                }
                Ok(None) => {
                    warn!(peer = %dest, attempt, max_retries, "timed out waiting for reply");
                }
                // ICMP unreachable surfaces here on some platforms; it is just a lost reply
                Err(Error::Io(e)) if is_unreachable(&e) => {
                    warn!(peer = %dest, attempt, max_retries, "peer unreachable: {}", e);
                    tokio::time::sleep(self.config.receive_timeout()).await;
                }
                Err(e) => return Err(e),
            }
        }

        warn!(peer = %dest, max_retries, "giving up, no reply");
        Err(Error::ExchangeTimeout {
            attempts: max_retries,
        })
    }

    // Put the request on the wire once, redrawing after each simulated loss.
    // With a loss probability of 1 every send is dropped and the attempt is
    // left to time out.
    async fn transmit(
        &self,
        channel: &DatagramChannel,
        payload: &[u8],
        dest: SocketAddr,
        attempt: u32,
    ) -> Result<()> {
        loop {
            if !self.simulate_loss() {
                channel.send_bytes(payload, dest).await?;
                debug!(peer = %dest, attempt, "request sent");
                return Ok(());
            }

            warn!(peer = %dest, attempt, "packet lost before send, retrying");
            tokio::time::sleep(self.config.inter_send_delay()).await;

            if self.config.loss_probability >= 1.0 {
                return Ok(());
            }
        }
    }

    fn simulate_loss(&self) -> bool {
        let p = self.config.loss_probability;
        if p <= 0.0 {
            return false;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen::<f64>() < p
    }
}

fn is_unreachable(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::ConnectionReset
    )
}
