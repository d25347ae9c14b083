//! Inventory domain module.
//!
//! This crate contains business rules for paper stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;
pub mod transaction;

pub use item::{InventoryItem, ItemDraft, ItemPatch};
pub use transaction::{
    Movement, NewTransaction, Priority, StockTransaction, TransactionStatus,
};
