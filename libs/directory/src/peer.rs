use std::net::SocketAddr;

use bazaar_core::Address;

/// A resolved peer, frozen at the moment it was looked up
///
/// Goes stale silently if the peer later re-registers elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerHandle {
    address: Address,
    socket_addr: SocketAddr,
}

impl PeerHandle {
    pub fn new(address: Address) -> bazaar_core::Result<Self> {
        let socket_addr = address.socket_addr()?;
        Ok(Self {
            address,
            socket_addr,
        })
    }

    pub fn hostname(&self) -> &str {
        &self.address.hostname
    }

    pub fn ip(&self) -> &str {
        &self.address.ip
    }

    pub fn port(&self) -> u16 {
        self.address.port
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Where to send datagrams for this peer
    pub fn socket_addr(&self) -> SocketAddr {
        self.socket_addr
    }
}
