//! API-side page gating.
//!
//! Enforces the per-account page allow-list at the route boundary, before any
//! workflow call. Role checks for individual operations (approve, review,
//! audit) stay in the workflow layer.

use axum::http::StatusCode;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Page names as exposed to clients and stored on accounts.
pub mod pages {
    pub const INVENTORY: &str = "inventory";
    pub const TRANSACTIONS: &str = "transactions";
    pub const APPROVALS: &str = "approvals";
    pub const ACCOUNTS: &str = "accounts";
    pub const AUDIT: &str = "audit";
}

/// Reject the request unless the account may open `page`.
///
/// Admins pass every gate; staff need an allow-list entry.
pub fn require_page(
    principal: &PrincipalContext,
    page: &str,
) -> Result<(), axum::response::Response> {
    if principal.account().can_access(page) {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("account may not access the {page} page"),
        ))
    }
}
