use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paperstock_core::{AccountId, EntryId};

/// One append-only audit record. Entries are facts; they are never edited or
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: EntryId,
    pub actor: AccountId,
    /// Username snapshot at the time of the action (accounts can be renamed
    /// or removed later; the log stays readable).
    pub username: String,
    /// Dotted verb, e.g. "inventory.item.updated", "accounts.approved".
    pub action: String,
    pub detail: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn record(
        actor: AccountId,
        username: impl Into<String>,
        action: impl Into<String>,
        detail: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            actor,
            username: username.into(),
            action: action.into(),
            detail: detail.into(),
            occurred_at: now,
        }
    }
}
