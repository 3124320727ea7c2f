//! Bazaar Fabric - Datagram transport and reliable exchange layer
//!
//! Provides the UDP [`DatagramChannel`], the text codec for the
//! whitespace-token wire format, the retrying [`Exchange`] every client role
//! uses to get a reply across a lossy network, and the [`server`] loop every
//! service runs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::net::SocketAddr;
//!
//! use bazaar_fabric::{server, DatagramChannel, Exchange, ExchangeConfig, Handler};
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl Handler for Echo {
//!     async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
//!         Some(message.to_string())
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = DatagramChannel::bind(7000).await?;
//! server::spawn(channel, Arc::new(Echo));
//!
//! let exchange = Exchange::new(ExchangeConfig::service())?;
//! let reply = exchange.request("127.0.0.1:7000".parse()?, "hello").await?;
//! assert_eq!(reply, "hello");
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod error;
pub mod exchange;
pub mod server;

// Re-exports for convenience
pub use channel::DatagramChannel;
pub use error::{Error, Result};
pub use exchange::{Exchange, ExchangeConfig};
pub use server::Handler;
