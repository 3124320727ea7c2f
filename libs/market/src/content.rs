use std::net::SocketAddr;

use bazaar_core::protocol::Request;
use bazaar_core::ContentTable;
use bazaar_fabric::Handler;
use tracing::{debug, info};

/// Answers `REQ <itemId>` with the item's content, or not at all
#[derive(Debug, Clone)]
pub struct ContentService {
    table: ContentTable,
}

impl ContentService {
    pub fn new(table: ContentTable) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl Handler for ContentService {
    async fn handle(&self, message: &str, _from: SocketAddr) -> Option<String> {
        let Request::FetchContent { item_id } = Request::parse(message)? else {
            return None;
        };

        match self.table.get(item_id) {
            Some(content) => {
                info!(item_id, "content retrieved");
                Some(content.to_string())
            }
            None => {
                debug!(item_id, "no content for item");
                None
            }
        }
    }
}
