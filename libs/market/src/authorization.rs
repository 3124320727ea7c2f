use std::net::SocketAddr;

use bazaar_core::protocol::{self, Request};
use bazaar_core::ItemId;
use bazaar_fabric::Handler;
use tracing::info;

/// Decides whether a payment for an item goes through
pub trait Authorizer: Send + Sync + 'static {
    fn authorize(&self, item_id: ItemId, price: f64, payment_token: &str) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(ItemId, f64, &str) -> bool + Send + Sync + 'static,
{
    fn authorize(&self, item_id: ItemId, price: f64, payment_token: &str) -> bool {
        self(item_id, price, payment_token)
    }
}

/// The bank's rule: even item ids are approved, odd ones declined
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenItems;

impl Authorizer for EvenItems {
    fn authorize(&self, item_id: ItemId, _price: f64, _payment_token: &str) -> bool {
        item_id % 2 == 0
    }
}

/// Answers `<itemId> <price> <paymentToken>` with `1` or `0`
///
/// The verdict depends only on the request content, so a resent request gets
/// the same answer.
#[derive(Debug)]
pub struct AuthorizationService<A> {
    authorizer: A,
}

impl<A: Authorizer> AuthorizationService<A> {
    pub fn new(authorizer: A) -> Self {
        Self { authorizer }
    }
}

#[async_trait::async_trait]
impl<A: Authorizer> Handler for AuthorizationService<A> {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        let Request::Authorize {
            item_id,
            price,
            payment_token,
        } = Request::parse(message)?
        else {
            return None;
        };

        let approved = self.authorizer.authorize(item_id, price, &payment_token);
        info!(item_id, price, approved, "authorization checked");
        let verdict = if approved {
            protocol::APPROVED
        } else {
            protocol::DECLINED
        };
        Some(verdict.to_string())
    }
}
