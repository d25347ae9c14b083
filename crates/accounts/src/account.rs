//! User account lifecycle.
//!
//! # Invariants
//! - Self-registered accounts are always Staff and start Pending.
//! - Only Approved accounts can authenticate.
//! - Admins bypass the per-page allow-list; Staff need an explicit entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paperstock_core::{AccountId, DomainError, DomainResult};

/// Account role. Admins apply inventory edits directly and decide change
/// requests; Staff edits go through the approval queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

/// Registration review state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Pending,
    Approved,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: AccountId,
    pub username: String,
    /// Plaintext, compared with string equality. This app runs on a trusted
    /// warehouse LAN and deliberately has no password hashing.
    pub password: String,
    pub role: Role,
    pub status: AccountStatus,
    /// UI pages this account may open, e.g. "inventory", "transactions".
    pub allowed_pages: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Self-registration: always a Staff account in Pending status.
    pub fn register(
        id: AccountId,
        username: &str,
        password: &str,
        allowed_pages: Vec<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        Ok(Self {
            id,
            username: username.to_string(),
            password: password.to_string(),
            role: Role::Staff,
            status: AccountStatus::Pending,
            allowed_pages: normalize_pages(allowed_pages),
            created_at: now,
        })
    }

    /// Seed constructor for the initial admin (Approved, all pages implicit).
    pub fn admin(
        id: AccountId,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut account = Self::register(id, username, password, Vec::new(), now)?;
        account.role = Role::Admin;
        account.status = AccountStatus::Approved;
        Ok(account)
    }

    /// Approve a pending registration.
    pub fn approve(&mut self) -> DomainResult<()> {
        if self.status != AccountStatus::Pending {
            return Err(DomainError::invariant("account is not pending review"));
        }
        self.status = AccountStatus::Approved;
        Ok(())
    }

    /// Deny a pending registration.
    pub fn deny(&mut self) -> DomainResult<()> {
        if self.status != AccountStatus::Pending {
            return Err(DomainError::invariant("account is not pending review"));
        }
        self.status = AccountStatus::Denied;
        Ok(())
    }

    /// Plain string comparison; no hashing.
    pub fn verify_password(&self, supplied: &str) -> bool {
        self.password == supplied
    }

    /// Page gate: admins see everything, staff need an allow-list entry.
    pub fn can_access(&self, page: &str) -> bool {
        if self.role.is_admin() {
            return true;
        }
        let page = page.trim().to_lowercase();
        self.allowed_pages.iter().any(|p| *p == page)
    }

    /// Case-insensitive username match (usernames are unique by this rule).
    pub fn matches_username(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username.trim())
    }
}

fn normalize_pages(pages: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = pages
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
