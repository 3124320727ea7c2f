//! Wire vocabulary shared by every process
//!
//! Messages are whitespace-separated UTF-8 tokens, one message per datagram.
//! The first token and the token count select the message type; anything that
//! does not fit one of the shapes below parses to `None` and is ignored by the
//! receiving service.

use std::fmt;

use crate::stock::ItemId;

/// Largest payload carried by a single datagram
pub const MAX_DATAGRAM: usize = 1024;

pub const REGISTER: &str = "REG";
pub const LOOKUP: &str = "LOOKUP";
pub const LIST: &str = "LIST";
pub const BUY: &str = "BUY";
pub const REQUEST_CONTENT: &str = "REQ";

pub const REGISTRATION_SUCCESS: &str = "REGISTRATION_SUCCESS";
pub const LOOKUP_ERROR: &str = "Error: Process has not registered with the Name Server";
pub const LIST_START: &str = "LIST_START";
pub const LIST_END: &str = "LIST_END";
pub const APPROVED: &str = "1";
pub const DECLINED: &str = "0";
pub const TRANSACTION_ABORTED: &str = "\"transaction aborted\"";

/// Well-known hostnames the processes register under
pub mod hosts {
    pub const STORE: &str = "Store";
    pub const BANK: &str = "Bank";
    pub const CONTENT: &str = "Content";
}

/// Every request shape understood by some service
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `REG <hostname> <port> <ip>`
    Register {
        hostname: String,
        port: u16,
        ip: String,
    },
    /// `LOOKUP <hostname>`
    Lookup { hostname: String },
    /// `LIST`
    List,
    /// `BUY <paymentToken> <itemId>`
    Buy {
        payment_token: String,
        item_id: ItemId,
    },
    /// `<itemId> <price> <paymentToken>`
    Authorize {
        item_id: ItemId,
        price: f64,
        payment_token: String,
    },
    /// `REQ <itemId>`
    FetchContent { item_id: ItemId },
}

impl Request {
    /// Decode a trimmed text payload, `None` if it fits no known shape
    pub fn parse(text: &str) -> Option<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        match tokens.as_slice() {
            [REGISTER, hostname, port, ip] => Some(Self::Register {
                hostname: hostname.to_string(),
                port: port.parse().ok()?,
                ip: ip.to_string(),
            }),
            [LOOKUP, hostname] => Some(Self::Lookup {
                hostname: hostname.to_string(),
            }),
            [LIST] => Some(Self::List),
            [BUY, token, item_id] => Some(Self::Buy {
                payment_token: token.to_string(),
                item_id: item_id.parse().ok()?,
            }),
            [REQUEST_CONTENT, item_id] => Some(Self::FetchContent {
                item_id: item_id.parse().ok()?,
            }),
            [item_id, price, token] => Some(Self::Authorize {
                item_id: item_id.parse().ok()?,
                price: price.parse().ok()?,
                payment_token: token.to_string(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register { hostname, port, ip } => {
                write!(f, "{REGISTER} {hostname} {port} {ip}")
            }
            Self::Lookup { hostname } => write!(f, "{LOOKUP} {hostname}"),
            Self::List => f.write_str(LIST),
            Self::Buy {
                payment_token,
                item_id,
            } => write!(f, "{BUY} {payment_token} {item_id}"),
            Self::Authorize {
                item_id,
                price,
                payment_token,
            } => write!(f, "{item_id} {} {payment_token}", format_price(*price)),
            Self::FetchContent { item_id } => write!(f, "{REQUEST_CONTENT} {item_id}"),
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Directory reply to a successful lookup
pub fn lookup_reply(ip: &str, port: u16) -> String {
    format!("{ip} {port}")
}

/// Split a lookup reply into `(ip, port)`
pub fn parse_lookup_reply(reply: &str) -> Option<(String, u16)> {
    match reply.split_whitespace().collect::<Vec<_>>().as_slice() {
        [ip, port] => Some((ip.to_string(), port.parse().ok()?)),
        _ => None,
    }
}

/// The one client-visible failure outcome of a purchase
pub fn abort_message(item_id: ItemId) -> String {
    format!("{item_id} {TRANSACTION_ABORTED}")
}

pub fn is_abort_message(reply: &str) -> bool {
    reply.contains(TRANSACTION_ABORTED)
}

/// Frame `<id> <price>` lines between the listing markers
pub fn format_listing<'a>(entries: impl IntoIterator<Item = (&'a ItemId, &'a f64)>) -> String {
    let mut listing = String::from(LIST_START);
    for (item_id, price) in entries {
        listing.push('\n');
        listing.push_str(&format!("{item_id} {}", format_price(*price)));
    }
    listing.push('\n');
    listing.push_str(LIST_END);
    listing
}

/// Recover the `(id, price)` entries from a listing reply
///
/// Returns `None` when the markers are missing or a body line is malformed.
pub fn parse_listing(reply: &str) -> Option<Vec<(ItemId, f64)>> {
    let mut lines = reply.lines().map(str::trim).filter(|line| !line.is_empty());
    if lines.next()? != LIST_START {
        return None;
    }

    let mut entries = Vec::new();
    for line in lines {
        if line == LIST_END {
            return Some(entries);
        }
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            [item_id, price] => entries.push((item_id.parse().ok()?, price.parse().ok()?)),
            _ => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn field_count_selects_the_shape() {
        assert_eq!(
            Request::parse("REG Bank 4000 localhost"),
            Some(Request::Register {
                hostname: "Bank".into(),
                port: 4000,
                ip: "localhost".into()
            })
        );
        assert_eq!(Request::parse("REG Bank 4000"), None);
        assert_eq!(Request::parse("LOOKUP"), None);
        assert_eq!(Request::parse("LIST"), Some(Request::List));
        assert_eq!(Request::parse("LIST extra"), None);
        assert_eq!(Request::parse(""), None);
    }

    #[test]
    fn buy_is_not_mistaken_for_authorization() {
        assert_eq!(
            Request::parse("BUY 1234 42"),
            Some(Request::Buy {
                payment_token: "1234".into(),
                item_id: 42
            })
        );
        assert_eq!(
            Request::parse("42 9.99 1234"),
            Some(Request::Authorize {
                item_id: 42,
                price: 9.99,
                payment_token: "1234".into()
            })
        );
        assert_eq!(Request::parse("BUY 1234 forty-two"), None);
    }

    #[test]
    fn surrounding_whitespace_is_insignificant() {
        assert_eq!(
            Request::parse("\n  REQ   7 \t"),
            Some(Request::FetchContent { item_id: 7 })
        );
    }

    #[test]
    fn authorization_request_uses_two_decimals() {
        let request = Request::Authorize {
            item_id: 42,
            price: 9.99,
            payment_token: "1234".into(),
        };
        assert_eq!(request.to_string(), "42 9.99 1234");
    }

    #[test]
    fn listing_is_framed_and_ordered() {
        let stock = BTreeMap::from([(2, 10.0), (1, 5.0)]);
        let listing = format_listing(&stock);

        assert_eq!(listing, "LIST_START\n1 5.00\n2 10.00\nLIST_END");
        assert_eq!(parse_listing(&listing), Some(vec![(1, 5.0), (2, 10.0)]));
    }

    #[test]
    fn truncated_listing_is_rejected() {
        assert_eq!(parse_listing("LIST_START\n1 5.00"), None);
        assert_eq!(parse_listing("1 5.00\nLIST_END"), None);
    }

    #[test]
    fn lookup_reply_splits_ip_and_port() {
        assert_eq!(
            parse_lookup_reply(&lookup_reply("localhost", 4000)),
            Some(("localhost".to_string(), 4000))
        );
        assert_eq!(parse_lookup_reply(LOOKUP_ERROR), None);
    }

    #[test]
    fn abort_message_is_tagged_with_item() {
        assert_eq!(abort_message(999), "999 \"transaction aborted\"");
        assert!(is_abort_message(&abort_message(999)));
    }
}
