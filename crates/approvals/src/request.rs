use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paperstock_core::{AccountId, DomainError, DomainResult, ItemId, RequestId};
use paperstock_inventory::{ItemDraft, ItemPatch};

/// A proposed mutation on the items collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Add { item_id: ItemId, draft: ItemDraft },
    Update { item_id: ItemId, patch: ItemPatch },
    Delete { item_id: ItemId },
}

impl ChangeAction {
    /// The item this action targets. For `Add` the id is assigned up front so
    /// the provisional item and the request agree.
    pub fn item_id(&self) -> ItemId {
        match self {
            ChangeAction::Add { item_id, .. } => *item_id,
            ChangeAction::Update { item_id, .. } => *item_id,
            ChangeAction::Delete { item_id } => *item_id,
        }
    }

    /// Shape-level validation (target-existence checks belong to the store).
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            // Drafts are fully validated when the item is materialized; reject
            // the obviously empty update here so it never enters the queue.
            ChangeAction::Add { .. } => Ok(()),
            ChangeAction::Update { patch, .. } => {
                if patch.is_empty() {
                    Err(DomainError::validation("update patch contains no changes"))
                } else {
                    Ok(())
                }
            }
            ChangeAction::Delete { .. } => Ok(()),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ChangeAction::Add { .. } => "add",
            ChangeAction::Update { .. } => "update",
            ChangeAction::Delete { .. } => "delete",
        }
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approved,
    Denied,
}

/// A deferred mutation awaiting admin decision.
///
/// Requests live only in the pending queue: a decided request is applied (or
/// discarded) and removed, never kept with a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: RequestId,
    pub action: ChangeAction,
    pub requested_by: AccountId,
    pub requested_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl ChangeRequest {
    pub fn new(
        id: RequestId,
        action: ChangeAction,
        requested_by: AccountId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        action.validate()?;
        Ok(Self {
            id,
            action,
            requested_by,
            requested_at: now,
            note,
        })
    }

    pub fn item_id(&self) -> ItemId {
        self.action.item_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_never_enters_the_queue() {
        let action = ChangeAction::Update {
            item_id: ItemId::new(),
            patch: ItemPatch::default(),
        };
        let res = ChangeRequest::new(RequestId::new(), action, AccountId::new(), None, Utc::now());
        assert!(res.is_err());
    }

    #[test]
    fn request_targets_the_action_item() {
        let item_id = ItemId::new();
        let req = ChangeRequest::new(
            RequestId::new(),
            ChangeAction::Delete { item_id },
            AccountId::new(),
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(req.item_id(), item_id);
    }
}
