//! Persisted store and synchronization layer.
//!
//! Five independent JSON collections (accounts, items, transactions,
//! change requests, audit log) live as files under one data directory. Every
//! mutation rewrites only the touched collection (save-on-change) and posts a
//! [`StoreNotice`] on the broadcast channel; other open handles re-read
//! storage on notice, and a 3-second [`RefreshWorker`] re-reads regardless as
//! a safety net.
//!
//! There are no transactional guarantees across collections: the last write
//! observed wins, exactly as a per-browser storage layer behaves.

pub mod collection;
pub mod notice;
pub mod refresh;
pub mod store;
pub mod workflow;

pub use collection::{JsonCollection, StoreError};
pub use notice::{Collection, StoreNotice};
pub use refresh::{NoticeListener, RefreshWorker, REFRESH_INTERVAL};
pub use store::StockStore;
pub use workflow::{Actor, ChangeOutcome, Workflow, WorkflowError};

#[cfg(test)]
mod integration_tests;
