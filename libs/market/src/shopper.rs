use std::fmt;
use std::net::SocketAddr;

use bazaar_core::protocol::{self, Request};
use bazaar_core::ItemId;
use bazaar_fabric::Exchange;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One line of the store's listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listing {
    pub item_id: ItemId,
    pub price: f64,
}

/// A finished purchase as the buyer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub item: Listing,
    pub reply: String,
}

impl Receipt {
    pub fn is_aborted(&self) -> bool {
        protocol::is_abort_message(&self.reply)
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aborted() {
            return f.write_str(&self.reply);
        }
        write!(
            f,
            "{} ($ {}) CONTENT {}",
            self.item.item_id,
            protocol::format_price(self.item.price),
            self.reply
        )
    }
}

/// Buyer-side client of the store
#[derive(Debug)]
pub struct StoreClient {
    store: SocketAddr,
    exchange: Exchange,
}

impl StoreClient {
    pub fn new(store: SocketAddr, exchange: Exchange) -> Self {
        Self { store, exchange }
    }

    /// Fetch the store's listing in item order
    pub async fn list(&self) -> Result<Vec<Listing>> {
        let reply = self.send(&Request::List).await?;
        let entries = protocol::parse_listing(&reply).ok_or(Error::MalformedListing(reply))?;
        Ok(entries
            .into_iter()
            .map(|(item_id, price)| Listing { item_id, price })
            .collect())
    }

    /// Send a `BUY` and return the store's raw reply
    pub async fn buy(&self, payment_token: &str, item_id: ItemId) -> Result<String> {
        self.send(&Request::Buy {
            payment_token: payment_token.to_string(),
            item_id,
        })
        .await
    }

    /// Buy the `number`-th entry (1-based) of the current listing
    pub async fn buy_listed(&self, payment_token: &str, number: usize) -> Result<Receipt> {
        let listing = self.list().await?;
        let item = number
            .checked_sub(1)
            .and_then(|index| listing.get(index))
            .copied()
            .ok_or(Error::NoSuchItem(number))?;

        let reply = self.buy(payment_token, item.item_id).await?;
        Ok(Receipt { item, reply })
    }

    async fn send(&self, request: &Request) -> Result<String> {
        let message = request.to_string();
        debug!(store = %self.store, %message, "sending to store");
        match self.exchange.request(self.store, &message).await {
            Ok(reply) => Ok(reply),
            Err(e) if e.is_timeout() => {
                warn!(store = %self.store, "store did not answer");
                Err(Error::StoreUnreachable)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Number the listing lines as the client prints them
pub fn numbered(listing: &[Listing]) -> String {
    listing
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}. {} {}",
                index + 1,
                entry.item_id,
                protocol::format_price(entry.price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
