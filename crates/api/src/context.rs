use paperstock_accounts::UserAccount;
use paperstock_store::Actor;

/// Principal context for a request (the authenticated account).
///
/// Resolved once by the auth middleware and carried as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    account: UserAccount,
}

impl PrincipalContext {
    pub fn new(account: UserAccount) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    pub fn actor(&self) -> Actor {
        Actor::from_account(&self.account)
    }
}
