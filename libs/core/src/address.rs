use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The literal accepted in place of a dotted-quad IP
pub const LOCALHOST: &str = "localhost";

const IPV4_OCTETS: usize = 4;

/// A registered location of a named process
///
/// `hostname` is an opaque identifier, never resolved through DNS. `ip` is
/// either [`LOCALHOST`] or a dotted-quad.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub hostname: String,
    pub ip: String,
    pub port: u16,
}

impl Address {
    /// Build a validated address
    pub fn new(hostname: impl Into<String>, ip: impl Into<String>, port: u16) -> Result<Self> {
        let address = Self {
            hostname: hostname.into(),
            ip: ip.into(),
            port,
        };
        address.validate()?;
        Ok(address)
    }

    /// Check hostname, ip and port against the directory's acceptance rules
    pub fn validate(&self) -> Result<()> {
        if !is_valid_hostname(&self.hostname) {
            return Err(Error::InvalidAddress("empty hostname".to_string()));
        }
        if !is_valid_ip(&self.ip) {
            return Err(Error::InvalidAddress(format!("bad ip '{}'", self.ip)));
        }
        if self.port == 0 {
            return Err(Error::InvalidAddress("port 0".to_string()));
        }
        Ok(())
    }

    /// Socket address to send datagrams to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip = resolve_ip(&self.ip)
            .ok_or_else(|| Error::InvalidAddress(format!("bad ip '{}'", self.ip)))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.hostname, self.ip, self.port)
    }
}

pub fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && !hostname.chars().any(char::is_whitespace)
}

/// `localhost` (any case) or four decimal octets in `[0, 255]`
pub fn is_valid_ip(ip: &str) -> bool {
    resolve_ip(ip).is_some()
}

/// Parse a port argument, accepting only `1..=65535`
pub fn parse_port(value: &str) -> Option<u16> {
    match value.parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

fn resolve_ip(ip: &str) -> Option<Ipv4Addr> {
    if ip.eq_ignore_ascii_case(LOCALHOST) {
        return Some(Ipv4Addr::LOCALHOST);
    }

    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != IPV4_OCTETS {
        return None;
    }

    let mut octets = [0u8; IPV4_OCTETS];
    for (octet, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}
