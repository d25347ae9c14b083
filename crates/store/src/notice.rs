//! Notices posted on the broadcast channel after storage writes.

use serde::{Deserialize, Serialize};

use paperstock_core::AccountId;

/// The five persisted collections.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Accounts,
    Items,
    Transactions,
    ChangeRequests,
    AuditLog,
}

impl Collection {
    /// File name of the collection inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Accounts => "accounts.json",
            Collection::Items => "items.json",
            Collection::Transactions => "transactions.json",
            Collection::ChangeRequests => "change_requests.json",
            Collection::AuditLog => "audit_log.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Items => "items",
            Collection::Transactions => "transactions",
            Collection::ChangeRequests => "change_requests",
            Collection::AuditLog => "audit_log",
        }
    }
}

/// A weak cache-invalidation signal: receivers re-read storage in full rather
/// than trusting any payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreNotice {
    /// A collection file was rewritten.
    DataModified { collection: Collection },
    /// A new account registered (shown to admins as a review prompt).
    UserRegistered { account_id: AccountId },
}
