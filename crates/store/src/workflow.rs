//! Role-gated operations over the store.
//!
//! Admin actors apply inventory edits directly; staff edits are queued as
//! [`ChangeRequest`]s and the targeted item is flagged `pending_approval`
//! until an admin decides. At most one undecided request may target an item.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use paperstock_accounts::{AccountStatus, Role, UserAccount};
use paperstock_approvals::{ChangeAction, ChangeRequest, Decision};
use paperstock_audit::AuditEntry;
use paperstock_broadcast::BroadcastChannel;
use paperstock_core::{AccountId, DomainError, ItemId, RequestId, TransactionId};
use paperstock_inventory::{
    InventoryItem, Movement, NewTransaction, StockTransaction, TransactionStatus,
};

use crate::collection::StoreError;
use crate::notice::StoreNotice;
use crate::store::StockStore;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Another change request already targets the item.
    #[error("item {item_id} already has a pending change request")]
    PendingApproval { item_id: ItemId },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account is awaiting approval")]
    AccountPending,

    #[error("account registration was denied")]
    AccountDenied,
}

/// The authenticated account performing an operation, resolved once at the
/// session boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub account_id: AccountId,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            role: account.role,
        }
    }

    fn require_admin(&self) -> Result<(), WorkflowError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Unauthorized.into())
        }
    }
}

/// How a submitted item change was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Applied immediately (admin actor).
    Applied { item_id: ItemId },
    /// Queued for admin review (staff actor).
    Queued { request_id: RequestId },
}

pub struct Workflow<B> {
    store: Arc<StockStore<B>>,
}

impl<B> Workflow<B>
where
    B: BroadcastChannel<StoreNotice>,
{
    pub fn new(store: Arc<StockStore<B>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StockStore<B> {
        &self.store
    }

    // -------------------------
    // Inventory changes
    // -------------------------

    /// Submit an add/update/delete. Admins apply directly; staff submissions
    /// enter the approval queue and flag the item.
    pub fn submit_item_change(
        &self,
        actor: &Actor,
        action: ChangeAction,
        note: Option<String>,
    ) -> Result<ChangeOutcome, WorkflowError> {
        action.validate()?;

        if actor.role.is_admin() {
            return self.apply_directly(actor, action);
        }
        self.queue_for_approval(actor, action, note)
    }

    fn apply_directly(
        &self,
        actor: &Actor,
        action: ChangeAction,
    ) -> Result<ChangeOutcome, WorkflowError> {
        let item_id = action.item_id();
        let verb = action.verb();
        let label = self
            .store
            .mutate_items(|items| apply_action(items, &action))??;

        // A direct delete orphans any queued request for the item; drop it so
        // the queue never holds an undecidable entry.
        if matches!(action, ChangeAction::Delete { .. }) {
            self.store
                .mutate_change_requests(|queue| -> Result<(), WorkflowError> {
                    queue.retain(|r| r.item_id() != item_id);
                    Ok(())
                })??;
        }

        self.audit(actor, format!("inventory.item.{verb}"), label)?;
        Ok(ChangeOutcome::Applied { item_id })
    }

    fn queue_for_approval(
        &self,
        actor: &Actor,
        action: ChangeAction,
        note: Option<String>,
    ) -> Result<ChangeOutcome, WorkflowError> {
        let item_id = action.item_id();
        if self
            .store
            .change_requests()
            .iter()
            .any(|r| r.item_id() == item_id)
        {
            return Err(WorkflowError::PendingApproval { item_id });
        }

        let now = Utc::now();

        // Flag the target up front. For Add the item is materialized now as a
        // provisional record so every view already shows it (flagged); a
        // denial removes it again.
        let label = self
            .store
            .mutate_items(|items| -> Result<String, WorkflowError> {
                match &action {
                    ChangeAction::Add { item_id, draft } => {
                        let mut item = InventoryItem::create(*item_id, draft.clone(), now)?;
                        item.pending_approval = true;
                        let label = item.sku_label();
                        items.push(item);
                        Ok(label)
                    }
                    ChangeAction::Update { item_id, .. } | ChangeAction::Delete { item_id } => {
                        let item = find_item_mut(items, *item_id)?;
                        item.pending_approval = true;
                        item.updated_at = now;
                        Ok(item.sku_label())
                    }
                }
            })??;

        let verb = action.verb();
        let request = ChangeRequest::new(RequestId::new(), action, actor.account_id, note, now)?;
        let request_id = request.id;

        self.store
            .mutate_change_requests(|queue| -> Result<(), WorkflowError> {
                queue.push(request);
                Ok(())
            })??;

        self.audit(
            actor,
            "approvals.requested",
            format!("{verb} of {label} queued for review"),
        )?;
        Ok(ChangeOutcome::Queued { request_id })
    }

    /// Decide a pending change request. Admin only.
    ///
    /// Approved requests are applied and the flag cleared; denied requests are
    /// reverted (a provisional Add disappears). Either way the request leaves
    /// the queue.
    pub fn decide_change(
        &self,
        actor: &Actor,
        request_id: RequestId,
        decision: Decision,
    ) -> Result<(), WorkflowError> {
        actor.require_admin()?;

        let request = self
            .store
            .change_requests()
            .into_iter()
            .find(|r| r.id == request_id)
            .ok_or(DomainError::NotFound)?;

        let now = Utc::now();
        let label = self
            .store
            .mutate_items(|items| -> Result<String, WorkflowError> {
                match (&request.action, decision) {
                    (ChangeAction::Add { item_id, .. }, Decision::Approved) => {
                        let item = find_item_mut(items, *item_id)?;
                        item.pending_approval = false;
                        item.updated_at = now;
                        Ok(item.sku_label())
                    }
                    (ChangeAction::Add { item_id, .. }, Decision::Denied) => {
                        remove_item(items, *item_id)
                    }
                    (ChangeAction::Update { item_id, patch }, Decision::Approved) => {
                        let item = find_item_mut(items, *item_id)?;
                        item.apply_patch(patch, now)?;
                        item.pending_approval = false;
                        Ok(item.sku_label())
                    }
                    (ChangeAction::Delete { item_id }, Decision::Approved) => {
                        remove_item(items, *item_id)
                    }
                    (ChangeAction::Update { item_id, .. }, Decision::Denied)
                    | (ChangeAction::Delete { item_id }, Decision::Denied) => {
                        let item = find_item_mut(items, *item_id)?;
                        item.pending_approval = false;
                        item.updated_at = now;
                        Ok(item.sku_label())
                    }
                }
            })??;

        self.store
            .mutate_change_requests(|queue| -> Result<(), WorkflowError> {
                queue.retain(|r| r.id != request_id);
                Ok(())
            })??;

        let verdict = match decision {
            Decision::Approved => "approvals.approved",
            Decision::Denied => "approvals.denied",
        };
        self.audit(
            actor,
            verdict,
            format!("{} of {label}", request.action.verb()),
        )?;
        Ok(())
    }

    // -------------------------
    // Stock movements
    // -------------------------

    /// Record a stock movement. IN and OUT adjust stock immediately; REORDER
    /// is a pending marker and moves no stock.
    pub fn record_movement(
        &self,
        actor: &Actor,
        new: NewTransaction,
    ) -> Result<StockTransaction, WorkflowError> {
        let txn = StockTransaction::record(TransactionId::new(), new, actor.account_id, Utc::now())?;

        let label = self
            .store
            .mutate_items(|items| -> Result<String, WorkflowError> {
                let item = find_item_mut(items, txn.item_id)?;
                match txn.movement {
                    Movement::In => item
                        .receive(txn.quantity, txn.occurred_at)?,
                    Movement::Out => item
                        .issue(txn.quantity, txn.occurred_at)?,
                    Movement::Reorder => {}
                }
                Ok(item.sku_label())
            })??;

        let stored = txn.clone();
        self.store
            .mutate_transactions(|txns| -> Result<(), WorkflowError> {
                txns.push(stored);
                Ok(())
            })??;

        let verb = match txn.movement {
            Movement::In => "inventory.stock.in",
            Movement::Out => "inventory.stock.out",
            Movement::Reorder => "inventory.stock.reorder",
        };
        self.audit(actor, verb, format!("{} x{}", label, txn.quantity))?;
        Ok(txn)
    }

    /// Mark a pending reorder as completed. Admin only. Stock is unchanged;
    /// the delivered goods are recorded as a separate IN movement.
    pub fn complete_reorder(
        &self,
        actor: &Actor,
        transaction_id: TransactionId,
    ) -> Result<(), WorkflowError> {
        self.resolve_reorder(actor, transaction_id, true)
    }

    /// Cancel a pending reorder. Admin only.
    pub fn cancel_reorder(
        &self,
        actor: &Actor,
        transaction_id: TransactionId,
    ) -> Result<(), WorkflowError> {
        self.resolve_reorder(actor, transaction_id, false)
    }

    fn resolve_reorder(
        &self,
        actor: &Actor,
        transaction_id: TransactionId,
        completed: bool,
    ) -> Result<(), WorkflowError> {
        actor.require_admin()?;

        self.store
            .mutate_transactions(|txns| -> Result<(), WorkflowError> {
                let txn = txns
                    .iter_mut()
                    .find(|t| t.id == transaction_id)
                    .ok_or(DomainError::NotFound)?;
                if completed {
                    txn.complete()?;
                } else {
                    txn.cancel()?;
                }
                Ok(())
            })??;

        let verb = if completed {
            "inventory.reorder.completed"
        } else {
            "inventory.reorder.cancelled"
        };
        self.audit(actor, verb, format!("transaction {transaction_id}"))?;
        Ok(())
    }

    /// Items at or below their reorder level.
    pub fn reorder_alerts(&self) -> Vec<InventoryItem> {
        self.store
            .items()
            .into_iter()
            .filter(InventoryItem::needs_reorder)
            .collect()
    }

    /// Reorder markers still awaiting resolution.
    pub fn pending_reorders(&self) -> Vec<StockTransaction> {
        self.store
            .transactions()
            .into_iter()
            .filter(|t| t.movement == Movement::Reorder && t.status == TransactionStatus::Pending)
            .collect()
    }

    // -------------------------
    // Accounts
    // -------------------------

    /// Self-registration. The account starts Pending and an admin must
    /// approve it before it can sign in.
    pub fn register_account(
        &self,
        username: &str,
        password: &str,
        allowed_pages: Vec<String>,
    ) -> Result<UserAccount, WorkflowError> {
        let now = Utc::now();
        let account = self
            .store
            .mutate_accounts(|accounts| -> Result<UserAccount, WorkflowError> {
                if accounts.iter().any(|a| a.matches_username(username)) {
                    return Err(DomainError::conflict("username is already taken").into());
                }
                let account =
                    UserAccount::register(AccountId::new(), username, password, allowed_pages, now)?;
                accounts.push(account.clone());
                Ok(account)
            })??;

        self.store.publish(StoreNotice::UserRegistered {
            account_id: account.id,
        });

        let entry = AuditEntry::record(
            account.id,
            account.username.clone(),
            "accounts.registered",
            "self-registration, awaiting review",
            now,
        );
        self.store.append_audit(entry)?;
        Ok(account)
    }

    /// Approve or deny a pending registration. Admin only.
    pub fn review_account(
        &self,
        actor: &Actor,
        account_id: AccountId,
        decision: Decision,
    ) -> Result<UserAccount, WorkflowError> {
        actor.require_admin()?;

        let reviewed = self
            .store
            .mutate_accounts(|accounts| -> Result<UserAccount, WorkflowError> {
                let account = accounts
                    .iter_mut()
                    .find(|a| a.id == account_id)
                    .ok_or(DomainError::NotFound)?;
                match decision {
                    Decision::Approved => account.approve()?,
                    Decision::Denied => account.deny()?,
                }
                Ok(account.clone())
            })??;

        let verb = match decision {
            Decision::Approved => "accounts.approved",
            Decision::Denied => "accounts.denied",
        };
        self.audit(actor, verb, reviewed.username.clone())?;
        Ok(reviewed)
    }

    /// Authenticate by username and password.
    ///
    /// Wrong-credential and unknown-user failures are indistinguishable;
    /// pending and denied accounts get distinct errors so the UI can explain.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, WorkflowError> {
        let account = self
            .store
            .accounts()
            .into_iter()
            .find(|a| a.matches_username(username))
            .ok_or(WorkflowError::InvalidCredentials)?;

        if !account.verify_password(password) {
            return Err(WorkflowError::InvalidCredentials);
        }
        match account.status {
            AccountStatus::Pending => Err(WorkflowError::AccountPending),
            AccountStatus::Denied => Err(WorkflowError::AccountDenied),
            AccountStatus::Approved => Ok(account),
        }
    }

    /// Seed the initial admin account. Idempotent: an existing account with
    /// the same username is left untouched.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<(), WorkflowError> {
        let now = Utc::now();
        let created = self
            .store
            .mutate_accounts(|accounts| -> Result<bool, WorkflowError> {
                if accounts.iter().any(|a| a.matches_username(username)) {
                    return Ok(false);
                }
                let account = UserAccount::admin(AccountId::new(), username, password, now)?;
                accounts.push(account);
                Ok(true)
            })??;

        if created {
            tracing::info!(username, "seeded initial admin account");
        }
        Ok(())
    }

    /// Full audit log, newest first. Admin only.
    pub fn audit_trail(&self, actor: &Actor) -> Result<Vec<AuditEntry>, WorkflowError> {
        actor.require_admin()?;
        let mut entries = self.store.audit_log();
        entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(entries)
    }

    fn audit(
        &self,
        actor: &Actor,
        action: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        let entry = AuditEntry::record(
            actor.account_id,
            actor.username.clone(),
            action,
            detail,
            Utc::now(),
        );
        self.store.append_audit(entry)?;
        Ok(())
    }
}

fn apply_action(
    items: &mut Vec<InventoryItem>,
    action: &ChangeAction,
) -> Result<String, WorkflowError> {
    match action {
        ChangeAction::Add { item_id, draft } => {
            if items.iter().any(|i| i.id == *item_id) {
                return Err(DomainError::conflict("item already exists").into());
            }
            let item = InventoryItem::create(*item_id, draft.clone(), Utc::now())?;
            let label = item.sku_label();
            items.push(item);
            Ok(label)
        }
        ChangeAction::Update { item_id, patch } => {
            let item = find_item_mut(items, *item_id)?;
            item.apply_patch(patch, Utc::now())?;
            Ok(item.sku_label())
        }
        ChangeAction::Delete { item_id } => remove_item(items, *item_id),
    }
}

fn find_item_mut(
    items: &mut [InventoryItem],
    item_id: ItemId,
) -> Result<&mut InventoryItem, WorkflowError> {
    items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| DomainError::NotFound.into())
}

fn remove_item(items: &mut Vec<InventoryItem>, item_id: ItemId) -> Result<String, WorkflowError> {
    let pos = items
        .iter()
        .position(|i| i.id == item_id)
        .ok_or(DomainError::NotFound)?;
    let removed = items.remove(pos);
    Ok(removed.sku_label())
}
