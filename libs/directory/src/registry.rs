use std::collections::HashMap;
use std::sync::Arc;

use bazaar_core::Address;
use tokio::sync::Mutex;

/// Hostname to address table owned by the directory service
///
/// Every read and write goes through one mutex. Entries are overwritten on
/// re-registration and never removed; the table lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Arc<Mutex<HashMap<String, Address>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `address.hostname`, returning the old one
    pub async fn register(&self, address: Address) -> Option<Address> {
        let mut entries = self.entries.lock().await;
        entries.insert(address.hostname.clone(), address)
    }

    pub async fn lookup(&self, hostname: &str) -> Option<Address> {
        self.entries.lock().await.get(hostname).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
