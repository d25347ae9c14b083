//! User account domain module.
//!
//! Registration, the PENDING/APPROVED/DENIED lifecycle, role gating and the
//! per-page allow-list live here. Passwords are plaintext string comparisons;
//! the app trusts its deployment and does not attempt a real security model.

pub mod account;

pub use account::{AccountStatus, Role, UserAccount};
