use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::DatagramChannel;

/// Pause after a failed receive before reading the socket again
pub const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// A service's reaction to one inbound message
///
/// Returning `None` sends nothing back, which is how every service treats
/// messages it does not understand.
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, message: &str, from: SocketAddr) -> Option<String>;
}

/// Receive datagrams forever, handling each on its own task
///
/// Replies go out from the listening socket to the captured source address.
/// Receive errors are logged and the loop carries on after
/// [`RECEIVE_ERROR_BACKOFF`].
pub async fn serve<H: Handler>(channel: DatagramChannel, handler: Arc<H>) {
    match channel.local_addr() {
        Ok(addr) => info!(%addr, "waiting for incoming messages"),
        Err(e) => warn!("listening on unknown address: {}", e),
    }

    loop {
        let (message, from) = match channel.receive().await {
            Ok(received) => received,
            Err(e) => {
                warn!("message read failure, ignoring: {}", e);
                tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                continue;
            }
        };
        debug!(peer = %from, %message, "message received");

        let handler = Arc::clone(&handler);
        let channel = channel.clone();
        tokio::spawn(async move {
            let Some(reply) = handler.handle(&message, from).await else {
                debug!(peer = %from, %message, "no reply");
                return;
            };
            match channel.send_to(&reply, from).await {
                Ok(()) => debug!(peer = %from, %reply, "reply sent"),
                Err(e) => warn!(peer = %from, "unable to send reply: {}", e),
            }
        });
    }
}

/// Run [`serve`] on a background task
pub fn spawn<H: Handler>(channel: DatagramChannel, handler: Arc<H>) -> JoinHandle<()> {
    tokio::spawn(serve(channel, handler))
}
