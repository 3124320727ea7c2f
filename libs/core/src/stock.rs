use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::protocol;

/// Item identifiers are 64-bit and ordered ascending in listings
pub type ItemId = u64;

/// Item prices offered by the store, read once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockTable {
    prices: BTreeMap<ItemId, f64>,
}

impl StockTable {
    pub fn new(prices: BTreeMap<ItemId, f64>) -> Self {
        Self { prices }
    }

    /// Read a stock file of `<itemId> <price>` lines
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut prices = BTreeMap::new();
        for (line, record) in records(text) {
            match record.split_whitespace().collect::<Vec<_>>().as_slice() {
                [item_id, price] => {
                    let item_id = parse_item_id(line, item_id)?;
                    prices.insert(item_id, parse_price(line, price)?);
                }
                _ => return Err(Error::malformed(line, "expected '<itemId> <price>'")),
            }
        }
        Ok(Self { prices })
    }

    pub fn price(&self, item_id: ItemId) -> Option<f64> {
        self.prices.get(&item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// The `LIST` reply body for this table
    pub fn listing(&self) -> String {
        protocol::format_listing(&self.prices)
    }
}

/// Content served per item, read once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTable {
    content: BTreeMap<ItemId, String>,
}

impl ContentTable {
    pub fn new(content: BTreeMap<ItemId, String>) -> Self {
        Self { content }
    }

    /// Read a content file of `<itemId> <content>` lines
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut content = BTreeMap::new();
        for (line, record) in records(text) {
            let (item_id, body) = record
                .split_once(char::is_whitespace)
                .ok_or_else(|| Error::malformed(line, "expected '<itemId> <content>'"))?;
            let body = body.trim();
            if body.is_empty() {
                return Err(Error::malformed(line, "empty content"));
            }
            content.insert(parse_item_id(line, item_id)?, body.to_string());
        }
        Ok(Self { content })
    }

    pub fn get(&self, item_id: ItemId) -> Option<&str> {
        self.content.get(&item_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

// Non-blank lines with their 1-based line numbers
fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

// Plain decimal with at most two fractional digits, as prices go on the wire
fn parse_price(line: usize, value: &str) -> Result<f64> {
    let bad = || Error::malformed(line, format!("bad price '{value}'"));
    let (whole, cents) = value.split_once('.').unwrap_or((value, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(cents) || cents.len() > 2 {
        return Err(bad());
    }
    value.parse().map_err(|_| bad())
}

fn parse_item_id(line: usize, value: &str) -> Result<ItemId> {
    value
        .parse()
        .map_err(|_| Error::malformed(line, format!("bad item id '{value}'")))
}
