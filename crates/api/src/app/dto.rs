use serde::Deserialize;
use serde_json::json;

use paperstock_accounts::UserAccount;
use paperstock_approvals::{ChangeRequest, Decision};
use paperstock_audit::AuditEntry;
use paperstock_inventory::{
    InventoryItem, ItemDraft, ItemPatch, Movement, Priority, StockTransaction,
};
use paperstock_store::ChangeOutcome;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub allowed_pages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub sheet_size: String,
    pub gsm: u32,
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub reorder_quantity: i64,
    pub note: Option<String>,
}

impl CreateItemRequest {
    pub fn into_draft(self) -> (ItemDraft, Option<String>) {
        let draft = ItemDraft {
            sheet_size: self.sheet_size,
            gsm: self.gsm,
            category: self.category,
            stock: self.stock,
            reorder_level: self.reorder_level,
            reorder_quantity: self.reorder_quantity,
        };
        (draft, self.note)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub sheet_size: Option<String>,
    pub gsm: Option<u32>,
    pub category: Option<String>,
    pub reorder_level: Option<i64>,
    pub reorder_quantity: Option<i64>,
    pub note: Option<String>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> (ItemPatch, Option<String>) {
        let patch = ItemPatch {
            sheet_size: self.sheet_size,
            gsm: self.gsm,
            category: self.category,
            reorder_level: self.reorder_level,
            reorder_quantity: self.reorder_quantity,
        };
        (patch, self.note)
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemRequest {
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub item_id: String,
    pub movement: Movement,
    pub quantity: i64,
    #[serde(default)]
    pub priority: Priority,
    pub vehicle: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

// -------------------------
// Response JSON mapping
// -------------------------

pub fn item_to_json(item: &InventoryItem) -> serde_json::Value {
    json!({
        "id": item.id.to_string(),
        "sku": item.sku_label(),
        "sheet_size": item.sheet_size,
        "gsm": item.gsm,
        "category": item.category,
        "stock": item.stock,
        "reorder_level": item.reorder_level,
        "reorder_quantity": item.reorder_quantity,
        "needs_reorder": item.needs_reorder(),
        "pending_approval": item.pending_approval,
        "created_at": item.created_at.to_rfc3339(),
        "updated_at": item.updated_at.to_rfc3339(),
    })
}

pub fn transaction_to_json(txn: &StockTransaction) -> serde_json::Value {
    json!({
        "id": txn.id.to_string(),
        "item_id": txn.item_id.to_string(),
        "movement": txn.movement,
        "quantity": txn.quantity,
        "status": txn.status,
        "priority": txn.priority,
        "vehicle": txn.vehicle,
        "note": txn.note,
        "recorded_by": txn.recorded_by.to_string(),
        "occurred_at": txn.occurred_at.to_rfc3339(),
    })
}

pub fn change_request_to_json(request: &ChangeRequest) -> serde_json::Value {
    json!({
        "id": request.id.to_string(),
        "item_id": request.item_id().to_string(),
        "action": request.action,
        "requested_by": request.requested_by.to_string(),
        "requested_at": request.requested_at.to_rfc3339(),
        "note": request.note,
    })
}

/// Account view for API responses. The password never leaves the server.
pub fn account_to_json(account: &UserAccount) -> serde_json::Value {
    json!({
        "id": account.id.to_string(),
        "username": account.username,
        "role": account.role.as_str(),
        "status": account.status,
        "allowed_pages": account.allowed_pages,
        "created_at": account.created_at.to_rfc3339(),
    })
}

pub fn audit_entry_to_json(entry: &AuditEntry) -> serde_json::Value {
    json!({
        "id": entry.id.to_string(),
        "actor": entry.actor.to_string(),
        "username": entry.username,
        "action": entry.action,
        "detail": entry.detail,
        "occurred_at": entry.occurred_at.to_rfc3339(),
    })
}

pub fn outcome_to_json(outcome: &ChangeOutcome) -> serde_json::Value {
    match outcome {
        ChangeOutcome::Applied { item_id } => json!({
            "status": "applied",
            "item_id": item_id.to_string(),
        }),
        ChangeOutcome::Queued { request_id } => json!({
            "status": "queued",
            "request_id": request_id.to_string(),
        }),
    }
}
