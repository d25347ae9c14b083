//! Same-origin broadcast channel (mechanics only).
//!
//! This crate provides the cross-handle notification mechanism the persisted
//! store uses as a weak cache-invalidation signal: when one writer saves a
//! collection, every other open handle is told to re-read storage.

pub mod channel;
pub mod local;

pub use channel::{BroadcastChannel, Subscription};
pub use local::{LocalChannel, LocalChannelError};
