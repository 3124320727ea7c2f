use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("No reply after {attempts} attempts")]
    ExchangeTimeout { attempts: u32 },

    #[error("Invalid exchange config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the error means the peer never answered
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ExchangeTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
