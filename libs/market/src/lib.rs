//! Bazaar Market - The store, its downstream services and its buyers
//!
//! - [`Coordinator`]: the store's `LIST`/`BUY` handler, sequencing payment
//!   authorization before content retrieval
//! - [`AuthorizationService`]: the bank, approving or declining payments
//! - [`ContentService`]: serves item content by id
//! - [`StoreClient`]: what a buyer uses to list and purchase

pub mod authorization;
pub mod content;
pub mod coordinator;
pub mod error;
pub mod shopper;

// Re-exports for convenience
pub use authorization::{AuthorizationService, Authorizer, EvenItems};
pub use content::ContentService;
pub use coordinator::{AbortReason, Coordinator, Outcome};
pub use error::{Error, Result};
pub use shopper::{Listing, Receipt, StoreClient};
