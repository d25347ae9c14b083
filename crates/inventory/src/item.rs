use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paperstock_core::{DomainError, DomainResult, ItemId};

/// One paper SKU: sheet size + GSM grade + category, with current stock and
/// reorder thresholds.
///
/// # Invariants
/// - `gsm` is strictly positive.
/// - `stock` never goes negative (issues are rejected, not clamped).
/// - `pending_approval` is set while a change request targeting this item is
///   unresolved. This is maintained by the workflow call sites, not by a
///   schema constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    /// Sheet dimensions, e.g. "20x30" (inches).
    pub sheet_size: String,
    /// Paper weight grade in grams-per-square-metre.
    pub gsm: u32,
    /// Stock category, e.g. "Duplex", "Kraft".
    pub category: String,
    pub stock: i64,
    /// Reorder is flagged when stock falls to this level or below.
    pub reorder_level: i64,
    /// Suggested quantity for a reorder.
    pub reorder_quantity: i64,
    pub pending_approval: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proposed fields for a new item (validated on `InventoryItem::create`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub sheet_size: String,
    pub gsm: u32,
    pub category: String,
    pub stock: i64,
    pub reorder_level: i64,
    pub reorder_quantity: i64,
}

/// Partial update to an existing item. `None` fields are left untouched.
///
/// Stock is deliberately absent: stock only moves through transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub sheet_size: Option<String>,
    pub gsm: Option<u32>,
    pub category: Option<String>,
    pub reorder_level: Option<i64>,
    pub reorder_quantity: Option<i64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.sheet_size.is_none()
            && self.gsm.is_none()
            && self.category.is_none()
            && self.reorder_level.is_none()
            && self.reorder_quantity.is_none()
    }
}

impl InventoryItem {
    /// Validate a draft and create the item.
    pub fn create(id: ItemId, draft: ItemDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_sku(&draft.sheet_size, draft.gsm, &draft.category)?;
        if draft.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        validate_thresholds(draft.reorder_level, draft.reorder_quantity)?;

        Ok(Self {
            id,
            sheet_size: draft.sheet_size.trim().to_string(),
            gsm: draft.gsm,
            category: draft.category.trim().to_string(),
            stock: draft.stock,
            reorder_level: draft.reorder_level,
            reorder_quantity: draft.reorder_quantity,
            pending_approval: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, revalidating the result.
    pub fn apply_patch(&mut self, patch: &ItemPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if patch.is_empty() {
            return Err(DomainError::validation("patch contains no changes"));
        }

        let sheet_size = patch.sheet_size.as_deref().unwrap_or(&self.sheet_size);
        let gsm = patch.gsm.unwrap_or(self.gsm);
        let category = patch.category.as_deref().unwrap_or(&self.category);
        validate_sku(sheet_size, gsm, category)?;

        let reorder_level = patch.reorder_level.unwrap_or(self.reorder_level);
        let reorder_quantity = patch.reorder_quantity.unwrap_or(self.reorder_quantity);
        validate_thresholds(reorder_level, reorder_quantity)?;

        self.sheet_size = sheet_size.trim().to_string();
        self.gsm = gsm;
        self.category = category.trim().to_string();
        self.reorder_level = reorder_level;
        self.reorder_quantity = reorder_quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Add incoming stock.
    pub fn receive(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock level overflow"))?;
        self.updated_at = now;
        Ok(())
    }

    /// Remove outgoing stock. Overdraw is rejected.
    pub fn issue(&mut self, quantity: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if quantity > self.stock {
            return Err(DomainError::invariant(format!(
                "stock cannot go negative (on hand: {}, requested: {quantity})",
                self.stock
            )));
        }
        self.stock -= quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Whether stock is at or below the reorder level.
    pub fn needs_reorder(&self) -> bool {
        self.stock <= self.reorder_level
    }

    /// Human-readable SKU label, e.g. "20x30 230gsm Duplex".
    pub fn sku_label(&self) -> String {
        format!("{} {}gsm {}", self.sheet_size, self.gsm, self.category)
    }
}

fn validate_sku(sheet_size: &str, gsm: u32, category: &str) -> DomainResult<()> {
    if sheet_size.trim().is_empty() {
        return Err(DomainError::validation("sheet size cannot be empty"));
    }
    if gsm == 0 {
        return Err(DomainError::validation("gsm must be positive"));
    }
    if category.trim().is_empty() {
        return Err(DomainError::validation("category cannot be empty"));
    }
    Ok(())
}

fn validate_thresholds(reorder_level: i64, reorder_quantity: i64) -> DomainResult<()> {
    if reorder_level < 0 {
        return Err(DomainError::validation("reorder level cannot be negative"));
    }
    if reorder_quantity < 0 {
        return Err(DomainError::validation("reorder quantity cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn draft() -> ItemDraft {
        ItemDraft {
            sheet_size: "20x30".to_string(),
            gsm: 230,
            category: "Duplex".to_string(),
            stock: 100,
            reorder_level: 20,
            reorder_quantity: 200,
        }
    }

    #[test]
    fn create_validates_sku_fields() {
        let mut d = draft();
        d.gsm = 0;
        assert!(InventoryItem::create(ItemId::new(), d, now()).is_err());

        let mut d = draft();
        d.sheet_size = "  ".to_string();
        assert!(InventoryItem::create(ItemId::new(), d, now()).is_err());
    }

    #[test]
    fn issue_rejects_overdraw() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        let err = item.issue(101, now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(item.stock, 100);
    }

    #[test]
    fn receive_and_issue_move_stock() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        item.receive(50, now()).unwrap();
        item.issue(120, now()).unwrap();
        assert_eq!(item.stock, 30);
    }

    #[test]
    fn receive_rejects_stock_overflow() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        item.stock = i64::MAX - 1;
        let err = item.receive(2, now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(item.stock, i64::MAX - 1);
    }

    #[test]
    fn reorder_flag_tracks_threshold() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        assert!(!item.needs_reorder());
        item.issue(80, now()).unwrap();
        assert!(item.needs_reorder());
    }

    #[test]
    fn empty_patch_is_rejected() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        let err = item.apply_patch(&ItemPatch::default(), now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_revalidates_combined_state() {
        let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
        let patch = ItemPatch {
            gsm: Some(0),
            ..Default::default()
        };
        assert!(item.apply_patch(&patch, now()).is_err());
        assert_eq!(item.gsm, 230);

        let patch = ItemPatch {
            gsm: Some(300),
            category: Some("Kraft".to_string()),
            ..Default::default()
        };
        item.apply_patch(&patch, now()).unwrap();
        assert_eq!(item.sku_label(), "20x30 300gsm Kraft");
    }

    proptest! {
        /// Stock stays non-negative under any interleaving of movements when
        /// errors are surfaced to the caller (rejected moves change nothing).
        #[test]
        fn stock_never_goes_negative(ops in prop::collection::vec((any::<bool>(), 1i64..500), 0..64)) {
            let mut item = InventoryItem::create(ItemId::new(), draft(), now()).unwrap();
            for (incoming, qty) in ops {
                let before = item.stock;
                let res = if incoming {
                    item.receive(qty, now())
                } else {
                    item.issue(qty, now())
                };
                if res.is_err() {
                    prop_assert_eq!(item.stock, before);
                }
                prop_assert!(item.stock >= 0);
            }
        }
    }
}
