use std::net::SocketAddr;

use bazaar_core::protocol::{self, Request};
use bazaar_core::Address;
use bazaar_fabric::Handler;
use tracing::{debug, info, warn};

use crate::registry::Registry;

/// Directory protocol handler
///
/// Purely reactive: answers `REG` and `LOOKUP`, stays silent on anything
/// else, including registrations that fail validation.
#[derive(Debug, Clone, Default)]
pub struct DirectoryService {
    registry: Registry,
}

impl DirectoryService {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate and upsert an entry, `None` when the registration is rejected
    pub async fn register(&self, hostname: String, port: u16, ip: String) -> Option<String> {
        let address = match Address::new(hostname, ip, port) {
            Ok(address) => address,
            Err(e) => {
                warn!("dropping registration: {}", e);
                return None;
            }
        };

        info!(hostname = %address.hostname, ip = %address.ip, port, "registered");
        if let Some(previous) = self.registry.register(address).await {
            debug!(%previous, "replaced previous entry");
        }
        Some(protocol::REGISTRATION_SUCCESS.to_string())
    }

    /// `"<ip> <port>"` for a known hostname, the lookup error string otherwise
    pub async fn lookup(&self, hostname: &str) -> String {
        match self.registry.lookup(hostname).await {
            Some(address) => protocol::lookup_reply(&address.ip, address.port),
            None => {
                debug!(hostname, "lookup of unregistered host");
                protocol::LOOKUP_ERROR.to_string()
            }
        }
    }
}

#[async_trait::async_trait]
impl Handler for DirectoryService {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        match Request::parse(message)? {
            Request::Register { hostname, port, ip } => self.register(hostname, port, ip).await,
            Request::Lookup { hostname } => Some(self.lookup(&hostname).await),
            _ => None,
        }
    }
}
