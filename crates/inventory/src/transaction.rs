use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paperstock_core::{AccountId, DomainError, DomainResult, ItemId, TransactionId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Movement {
    /// Stock received into the warehouse.
    In,
    /// Stock issued out (dispatch to a customer/job).
    Out,
    /// A reorder marker; no stock change until the goods arrive as an IN.
    Reorder,
}

/// Workflow status of a transaction.
///
/// IN/OUT movements complete immediately; REORDER markers stay pending until
/// resolved by an admin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Dispatch priority attached to a movement.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Immutable record of a stock movement.
///
/// The movement facts (`movement`, `quantity`, `occurred_at`) are never
/// rewritten once recorded; `status` is workflow metadata and is the only
/// mutable field (pending reorders get completed or cancelled).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: TransactionId,
    pub item_id: ItemId,
    pub movement: Movement,
    pub quantity: i64,
    pub status: TransactionStatus,
    pub priority: Priority,
    /// Delivery vehicle for dispatches, e.g. "KA-05 truck".
    pub vehicle: Option<String>,
    pub note: Option<String>,
    pub recorded_by: AccountId,
    pub occurred_at: DateTime<Utc>,
}

/// Proposed movement (validated on `StockTransaction::record`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub item_id: ItemId,
    pub movement: Movement,
    pub quantity: i64,
    #[serde(default)]
    pub priority: Priority,
    pub vehicle: Option<String>,
    pub note: Option<String>,
}

impl StockTransaction {
    /// Validate and record a movement.
    pub fn record(
        id: TransactionId,
        new: NewTransaction,
        recorded_by: AccountId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let status = match new.movement {
            Movement::In | Movement::Out => TransactionStatus::Completed,
            Movement::Reorder => TransactionStatus::Pending,
        };

        Ok(Self {
            id,
            item_id: new.item_id,
            movement: new.movement,
            quantity: new.quantity,
            status,
            priority: new.priority,
            vehicle: new.vehicle,
            note: new.note,
            recorded_by,
            occurred_at: now,
        })
    }

    /// Mark a pending reorder as completed.
    pub fn complete(&mut self) -> DomainResult<()> {
        self.transition(TransactionStatus::Completed)
    }

    /// Cancel a pending reorder.
    pub fn cancel(&mut self) -> DomainResult<()> {
        self.transition(TransactionStatus::Cancelled)
    }

    fn transition(&mut self, to: TransactionStatus) -> DomainResult<()> {
        if self.status != TransactionStatus::Pending {
            return Err(DomainError::invariant(format!(
                "only pending transactions can transition (current: {:?})",
                self.status
            )));
        }
        self.status = to;
        Ok(())
    }
}
