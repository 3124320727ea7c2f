//! Bazaar Directory - Hostname registration and lookup
//!
//! The [`DirectoryService`] holds the in-memory [`Registry`] and answers the
//! `REG`/`LOOKUP` protocol. Every other process uses a [`DirectoryClient`] to
//! announce itself and to resolve peers into [`PeerHandle`]s.

pub mod client;
pub mod error;
pub mod peer;
pub mod registry;
pub mod service;

// Re-exports for convenience
pub use client::DirectoryClient;
pub use error::{Error, Result};
pub use peer::PeerHandle;
pub use registry::Registry;
pub use service::DirectoryService;
