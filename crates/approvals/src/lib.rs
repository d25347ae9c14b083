//! Change-approval domain module.
//!
//! A change request is a deferred inventory mutation: staff edits are parked
//! here until an admin approves or denies them.

pub mod request;

pub use request::{ChangeAction, ChangeRequest, Decision};
