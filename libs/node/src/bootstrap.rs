//! Startup steps shared by the service processes
//!
//! Every step here is fatal on failure: a process that cannot bind, load
//! its table, register, or find a required peer exits with the matching
//! [`ExitStatus`](crate::ExitStatus).

use std::path::Path;
use std::sync::Arc;

use bazaar_directory::{DirectoryClient, PeerHandle};
use bazaar_fabric::{server, DatagramChannel, Exchange, ExchangeConfig, Handler};
use tracing::info;

use crate::config::NodeConfig;
use crate::exit::Fatal;

/// Load a table file, any failure is a bad-arguments exit
pub fn load_table<T>(
    path: &Path,
    load: impl FnOnce(&Path) -> bazaar_core::Result<T>,
) -> Result<T, Fatal> {
    load(path).map_err(|source| Fatal::Table {
        path: path.to_path_buf(),
        source,
    })
}

pub fn exchange(config: &ExchangeConfig) -> Result<Exchange, Fatal> {
    Exchange::new(config.clone()).map_err(|e| Fatal::Config(e.to_string()))
}

pub async fn bind(port: u16) -> Result<DatagramChannel, Fatal> {
    DatagramChannel::bind(port).await.map_err(Fatal::Bind)
}

/// Directory client for the nameserver on this host
pub fn directory(nameserver_port: u16, config: &NodeConfig) -> Result<DirectoryClient, Fatal> {
    Ok(DirectoryClient::local(
        nameserver_port,
        exchange(&config.service_exchange)?,
    ))
}

pub async fn register(
    directory: &DirectoryClient,
    hostname: &str,
    port: u16,
    config: &NodeConfig,
) -> Result<(), Fatal> {
    directory
        .register(hostname, port, &config.advertise_ip)
        .await
        .map_err(Fatal::Registration)
}

/// Resolve a peer the process cannot run without
pub async fn resolve(directory: &DirectoryClient, hostname: &str) -> Result<PeerHandle, Fatal> {
    let peer = directory.resolve(hostname).await.map_err(Fatal::Lookup)?;
    info!(hostname, addr = %peer.socket_addr(), "lookup succeeded");
    Ok(peer)
}

/// Bind, announce under `hostname`, then serve until killed
pub async fn register_and_serve<H: Handler>(
    hostname: &str,
    port: u16,
    nameserver_port: u16,
    config: &NodeConfig,
    handler: Arc<H>,
) -> Result<(), Fatal> {
    let channel = bind(port).await?;
    let directory = directory(nameserver_port, config)?;
    register(&directory, hostname, port, config).await?;

    server::serve(channel, handler).await;
    Ok(())
}
