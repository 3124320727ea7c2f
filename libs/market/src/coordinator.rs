//! Purchase choreography run by the store
//!
//! A purchase checks the local stock, asks the authorization peer to approve
//! the payment and only then fetches the content. Every way this can fail is
//! collapsed into the same `<itemId> "transaction aborted"` reply; the cause
//! only shows up in the logs.
//!
//! There is no compensation step: if authorization succeeds and the content
//! fetch then fails, the authorizer has already approved the payment and is
//! never told otherwise.

use std::fmt;
use std::net::SocketAddr;

use bazaar_core::protocol::{self, Request};
use bazaar_core::{ItemId, StockTable};
use bazaar_directory::PeerHandle;
use bazaar_fabric::{Exchange, Handler};
use tracing::{debug, info, warn};

/// Why a purchase was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    UnknownItem,
    Declined,
    AuthorizationUnavailable,
    UnexpectedAuthorization,
    ContentUnavailable,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownItem => "item not in stock",
            Self::Declined => "payment declined",
            Self::AuthorizationUnavailable => "authorizer did not answer",
            Self::UnexpectedAuthorization => "authorizer sent an unexpected reply",
            Self::ContentUnavailable => "content could not be fetched",
        };
        f.write_str(reason)
    }
}

/// Result of one purchase
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Delivered(String),
    Aborted { item_id: ItemId, reason: AbortReason },
}

impl Outcome {
    /// What the buyer is sent back
    pub fn reply(&self) -> String {
        match self {
            Self::Delivered(content) => content.clone(),
            Self::Aborted { item_id, .. } => protocol::abort_message(*item_id),
        }
    }
}

/// Store-side coordinator for `LIST` and `BUY`
#[derive(Debug)]
pub struct Coordinator {
    stock: StockTable,
    authorizer: PeerHandle,
    content: PeerHandle,
    exchange: Exchange,
}

impl Coordinator {
    pub fn new(
        stock: StockTable,
        authorizer: PeerHandle,
        content: PeerHandle,
        exchange: Exchange,
    ) -> Self {
        Self {
            stock,
            authorizer,
            content,
            exchange,
        }
    }

    pub fn stock(&self) -> &StockTable {
        &self.stock
    }

    pub fn listing(&self) -> String {
        self.stock.listing()
    }

    /// Authorize then fetch, strictly in that order
    pub async fn purchase(&self, payment_token: &str, item_id: ItemId) -> Outcome {
        let abort = |reason: AbortReason| {
            info!(item_id, %reason, "transaction aborted");
            Outcome::Aborted { item_id, reason }
        };

        let Some(price) = self.stock.price(item_id) else {
            return abort(AbortReason::UnknownItem);
        };

        let authorization = Request::Authorize {
            item_id,
            price,
            payment_token: payment_token.to_string(),
        };
        let verdict = match self
            .ask(self.authorizer.socket_addr(), &authorization)
            .await
        {
            Some(verdict) => verdict,
            None => return abort(AbortReason::AuthorizationUnavailable),
        };

        match verdict.as_str() {
            protocol::APPROVED => debug!(item_id, "payment approved"),
            protocol::DECLINED => return abort(AbortReason::Declined),
            other => {
                warn!(item_id, reply = other, "unrecognised authorization reply");
                return abort(AbortReason::UnexpectedAuthorization);
            }
        }

        match self
            .ask(self.content.socket_addr(), &Request::FetchContent { item_id })
            .await
        {
            Some(content) if !content.is_empty() => {
                info!(item_id, "purchase complete");
                Outcome::Delivered(content)
            }
            _ => abort(AbortReason::ContentUnavailable),
        }
    }

    // `None` when the exchange fails for any reason
    async fn ask(&self, peer: SocketAddr, request: &Request) -> Option<String> {
        let message = request.to_string();
        debug!(%peer, %message, "forwarding");
        match self.exchange.request(peer, &message).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!(%peer, %message, "exchange failed: {}", e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl Handler for Coordinator {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        match Request::parse(message)? {
            Request::List => Some(self.listing()),
            Request::Buy {
                payment_token,
                item_id,
            } => Some(self.purchase(&payment_token, item_id).await.reply()),
            _ => None,
        }
    }
}
