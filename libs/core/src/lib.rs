//! Bazaar Core - Shared vocabulary for the marketplace processes
//!
//! Holds the pieces every process agrees on: the [`Address`] record kept by
//! the directory, the whitespace-separated wire vocabulary in [`protocol`],
//! and the item tables the store and content services serve from.
//!
//! # Example
//!
//! ```
//! use bazaar_core::protocol::Request;
//!
//! let request = Request::parse("  BUY 1234567812345678 42 ").unwrap();
//! assert_eq!(request.to_string(), "BUY 1234567812345678 42");
//! ```

pub mod address;
pub mod error;
pub mod protocol;
pub mod stock;

// Re-exports for convenience
pub use address::Address;
pub use error::{Error, Result};
pub use stock::{ContentTable, ItemId, StockTable};
