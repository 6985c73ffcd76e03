//! Service layer for EduCenter
//!
//! Feature-level rules that sit on top of the store: the store itself is
//! referentially blind, so dependency checks before deletes, payment
//! balances and foreign-id lookups live here.

pub mod catalog;
pub mod receipts;
pub mod references;

pub use catalog::CatalogService;
pub use receipts::ReceiptService;
pub use references::{ReferenceResolver, UNKNOWN_NAME};
