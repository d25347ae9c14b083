//! Opaque bearer-token session store.
//!
//! Sessions live only in process memory: a restart signs everyone out, which
//! is acceptable for a small warehouse deployment.

use std::collections::HashMap;
use std::sync::Mutex;

use paperstock_accounts::UserAccount;
use paperstock_core::AccountId;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, UserAccount>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a token for a signed-in account.
    pub fn issue(&self, account: UserAccount) -> String {
        let token = uuid::Uuid::now_v7().simple().to_string();
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(token.clone(), account);
        }
        token
    }

    /// Look up the account behind a token.
    pub fn resolve(&self, token: &str) -> Option<UserAccount> {
        self.sessions.lock().ok()?.get(token).cloned()
    }

    pub fn revoke(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(token);
        }
    }

    /// Drop every session belonging to `account_id` (used when an account is
    /// denied after sign-in).
    pub fn revoke_account(&self, account_id: AccountId) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.retain(|_, account| account.id != account_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(name: &str) -> UserAccount {
        UserAccount::register(AccountId::new(), name, "pw", vec![], Utc::now()).unwrap()
    }

    #[test]
    fn issued_tokens_resolve_until_revoked() {
        let store = SessionStore::new();
        let token = store.issue(account("alice"));

        assert_eq!(store.resolve(&token).unwrap().username, "alice");
        store.revoke(&token);
        assert!(store.resolve(&token).is_none());
    }

    #[test]
    fn revoke_account_drops_all_its_sessions() {
        let store = SessionStore::new();
        let alice = account("alice");
        let t1 = store.issue(alice.clone());
        let t2 = store.issue(alice.clone());
        let other = store.issue(account("bob"));

        store.revoke_account(alice.id);

        assert!(store.resolve(&t1).is_none());
        assert!(store.resolve(&t2).is_none());
        assert!(store.resolve(&other).is_some());
    }
}
