use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};

use bazaar_core::protocol::{self, Request};
use bazaar_core::Address;
use bazaar_fabric::Exchange;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::peer::PeerHandle;

/// Registers this process and resolves peers through the directory
///
/// Resolved peers are cached for the lifetime of the client with no expiry.
#[derive(Debug)]
pub struct DirectoryClient {
    directory: SocketAddr,
    exchange: Exchange,
    peers: Mutex<HashMap<String, PeerHandle>>,
}

impl DirectoryClient {
    pub fn new(directory: SocketAddr, exchange: Exchange) -> Self {
        Self {
            directory,
            exchange,
            peers: Mutex::new(HashMap::new()),
        }
    }

    /// Client for a directory listening on this host
    pub fn local(port: u16, exchange: Exchange) -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, port)), exchange)
    }

    pub fn directory(&self) -> SocketAddr {
        self.directory
    }

    /// Announce `hostname` at `ip:port`
    ///
    /// Anything other than the success token, including no reply at all,
    /// is a [`Error::RegistrationFailed`].
    pub async fn register(&self, hostname: &str, port: u16, ip: &str) -> Result<()> {
        let request = Request::Register {
            hostname: hostname.to_string(),
            port,
            ip: ip.to_string(),
        };

        let failed = |reason: String| Error::RegistrationFailed {
            hostname: hostname.to_string(),
            reason,
        };

        let reply = self
            .exchange
            .request(self.directory, &request.to_string())
            .await
            .map_err(|e| failed(e.to_string()))?;

        if reply != protocol::REGISTRATION_SUCCESS {
            return Err(failed(format!("unexpected reply '{}'", reply)));
        }

        info!(hostname, ip, port, "registered with directory");
        Ok(())
    }

    /// Resolve `hostname`, asking the directory only on a cache miss
    pub async fn resolve(&self, hostname: &str) -> Result<PeerHandle> {
        if let Some(peer) = self.peer(hostname).await {
            return Ok(peer);
        }

        let peer = self.lookup(hostname).await?;
        self.peers
            .lock()
            .await
            .insert(hostname.to_string(), peer.clone());
        Ok(peer)
    }

    /// A previously resolved peer, without contacting the directory
    pub async fn peer(&self, hostname: &str) -> Option<PeerHandle> {
        self.peers.lock().await.get(hostname).cloned()
    }

    async fn lookup(&self, hostname: &str) -> Result<PeerHandle> {
        let request = Request::Lookup {
            hostname: hostname.to_string(),
        };

        let reply = match self
            .exchange
            .request(self.directory, &request.to_string())
            .await
        {
            Ok(reply) => reply,
            Err(e) if e.is_timeout() => {
                warn!(hostname, directory = %self.directory, "directory did not answer lookup");
                return Err(Error::DirectoryUnreachable {
                    hostname: hostname.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if reply == protocol::LOOKUP_ERROR {
            warn!(hostname, "host has not registered");
            return Err(Error::UnknownHost(hostname.to_string()));
        }

        let (ip, port) = protocol::parse_lookup_reply(&reply)
            .ok_or_else(|| Error::MalformedReply(reply.clone()))?;
        let peer = Address::new(hostname, ip, port)
            .and_then(PeerHandle::new)
            .map_err(|_| Error::MalformedReply(reply))?;

        debug!(hostname, addr = %peer.socket_addr(), "lookup succeeded");
        Ok(peer)
    }
}
