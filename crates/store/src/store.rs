//! The five-collection persisted store.

use std::fs;
use std::path::{Path, PathBuf};

use paperstock_accounts::UserAccount;
use paperstock_approvals::ChangeRequest;
use paperstock_audit::AuditEntry;
use paperstock_broadcast::BroadcastChannel;
use paperstock_inventory::{InventoryItem, StockTransaction};

use crate::collection::{JsonCollection, StoreError};
use crate::notice::{Collection, StoreNotice};

/// Handle over the persisted collections.
///
/// One handle corresponds to one "tab": several handles may point at the same
/// data directory, each with its own in-memory copy. Handles stay loosely in
/// sync through the broadcast channel and the periodic refresh; there is no
/// locking across handles (last write observed wins).
#[derive(Debug)]
pub struct StockStore<B> {
    dir: PathBuf,
    accounts: JsonCollection<UserAccount>,
    items: JsonCollection<InventoryItem>,
    transactions: JsonCollection<StockTransaction>,
    change_requests: JsonCollection<ChangeRequest>,
    audit_log: JsonCollection<AuditEntry>,
    channel: B,
}

impl<B> StockStore<B>
where
    B: BroadcastChannel<StoreNotice>,
{
    /// Open (creating the directory if needed) the five collections under
    /// `dir`, wired to `channel` for change notices.
    pub fn open(dir: impl Into<PathBuf>, channel: B) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let path = |c: Collection| dir.join(c.file_name());

        Ok(Self {
            accounts: JsonCollection::open(path(Collection::Accounts))?,
            items: JsonCollection::open(path(Collection::Items))?,
            transactions: JsonCollection::open(path(Collection::Transactions))?,
            change_requests: JsonCollection::open(path(Collection::ChangeRequests))?,
            audit_log: JsonCollection::open(path(Collection::AuditLog))?,
            dir,
            channel,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn channel(&self) -> &B {
        &self.channel
    }

    /// Re-read every collection from disk (the disk copy wins).
    ///
    /// Collections are reloaded independently; the first failure is returned
    /// but the remaining collections are still attempted, so one corrupt file
    /// cannot freeze the rest.
    pub fn reload_all(&self) -> Result<(), StoreError> {
        let mut first_err = None;

        for (collection, res) in [
            (Collection::Accounts, self.accounts.reload()),
            (Collection::Items, self.items.reload()),
            (Collection::Transactions, self.transactions.reload()),
            (Collection::ChangeRequests, self.change_requests.reload()),
            (Collection::AuditLog, self.audit_log.reload()),
        ] {
            if let Err(e) = res {
                tracing::warn!(collection = collection.as_str(), error = %e, "reload failed; keeping in-memory copy");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    // -------------------------
    // Snapshots
    // -------------------------

    pub fn accounts(&self) -> Vec<UserAccount> {
        self.accounts.snapshot()
    }

    pub fn items(&self) -> Vec<InventoryItem> {
        self.items.snapshot()
    }

    pub fn transactions(&self) -> Vec<StockTransaction> {
        self.transactions.snapshot()
    }

    pub fn change_requests(&self) -> Vec<ChangeRequest> {
        self.change_requests.snapshot()
    }

    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.audit_log.snapshot()
    }

    // -------------------------
    // Save-on-change mutators
    // -------------------------
    //
    // Each mutator touches exactly one collection file and posts one
    // DataModified notice on success.

    pub fn mutate_accounts<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<UserAccount>) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let res = self.accounts.try_mutate(f)?;
        if res.is_ok() {
            self.publish(StoreNotice::DataModified {
                collection: Collection::Accounts,
            });
        }
        Ok(res)
    }

    pub fn mutate_items<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<InventoryItem>) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let res = self.items.try_mutate(f)?;
        if res.is_ok() {
            self.publish(StoreNotice::DataModified {
                collection: Collection::Items,
            });
        }
        Ok(res)
    }

    pub fn mutate_transactions<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<StockTransaction>) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let res = self.transactions.try_mutate(f)?;
        if res.is_ok() {
            self.publish(StoreNotice::DataModified {
                collection: Collection::Transactions,
            });
        }
        Ok(res)
    }

    pub fn mutate_change_requests<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<ChangeRequest>) -> Result<R, E>,
    ) -> Result<Result<R, E>, StoreError> {
        let res = self.change_requests.try_mutate(f)?;
        if res.is_ok() {
            self.publish(StoreNotice::DataModified {
                collection: Collection::ChangeRequests,
            });
        }
        Ok(res)
    }

    /// Append-only: the audit log is never edited in place.
    pub fn append_audit(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.audit_log
            .try_mutate(|log| -> Result<(), StoreError> {
                log.push(entry);
                Ok(())
            })??;

        self.publish(StoreNotice::DataModified {
            collection: Collection::AuditLog,
        });
        Ok(())
    }

    /// Post a notice. Failures are logged and swallowed: the broadcast is a
    /// weak signal and the polling fallback covers missed invalidations.
    pub(crate) fn publish(&self, notice: StoreNotice) {
        if let Err(e) = self.channel.publish(notice) {
            tracing::warn!(error = ?e, "broadcast publish failed");
        }
    }
}
