use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::protocol::MAX_DATAGRAM;
use tokio::net::UdpSocket;
use tracing::trace;

use crate::codec::TextCodec;
use crate::error::{Error, Result};

/// Datagram channel over an unreliable, unordered UDP socket
///
/// Combines a bound socket and the text codec. Cloning is cheap and clones
/// share the socket, so a server can reply from the port it listens on.
#[derive(Debug, Clone)]
pub struct DatagramChannel {
    socket: Arc<UdpSocket>,
    codec: TextCodec,
}

impl DatagramChannel {
    /// Bind to a local port on all interfaces
    pub async fn bind(port: u16) -> Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await
    }

    /// Bind to a specific local address
    pub async fn bind_addr(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        Ok(Self {
            socket: Arc::new(socket),
            codec: TextCodec,
        })
    }

    /// Bind to an OS-assigned port
    pub async fn ephemeral() -> Result<Self> {
        Self::bind(0).await
    }

    /// Get the local address this channel is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Receive a raw datagram and its source
    ///
    /// Reads up to one byte past [`MAX_DATAGRAM`], so an oversized datagram
    /// comes back longer than the limit.
    pub async fn receive_raw(&self) -> Result<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM + 1];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(len);
        Ok((buf, from))
    }

    /// Receive the next decodable message
    ///
    /// Datagrams that are oversized or do not decode are dropped without a reply.
    pub async fn receive(&self) -> Result<(String, SocketAddr)> {
        loop {
            let (bytes, from) = self.receive_raw().await?;
            if bytes.len() > MAX_DATAGRAM {
                trace!(peer = %from, len = bytes.len(), "dropping oversized datagram");
                continue;
            }
            match self.codec.decode(&bytes) {
                Some(message) => return Ok((message, from)),
                None => trace!(peer = %from, len = bytes.len(), "dropping undecodable datagram"),
            }
        }
    }

    /// Receive with a deadline, `None` if nothing decodable arrived in time
    pub async fn receive_timeout(&self, timeout: Duration) -> Result<Option<(String, SocketAddr)>> {
        match tokio::time::timeout(timeout, self.receive()).await {
            Ok(received) => received.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Send a message, best effort
    pub async fn send_to(&self, message: &str, dest: SocketAddr) -> Result<()> {
        let bytes = self.codec.encode(message)?;
        self.send_bytes(&bytes, dest).await
    }

    pub(crate) async fn send_bytes(&self, bytes: &[u8], dest: SocketAddr) -> Result<()> {
        self.socket.send_to(bytes, dest).await?;
        Ok(())
    }

    pub(crate) fn codec(&self) -> TextCodec {
        self.codec
    }
}
