//! Broadcast publish/subscribe abstraction (mechanics only).
//!
//! This is the in-process analogue of a same-origin browser broadcast channel:
//! a writer posts a notice, every subscribed handle (every "tab") gets a copy.
//!
//! Delivery is intentionally **weak**:
//!
//! - **Best-effort**: a notice may be missed (a subscriber that joins late, a
//!   dropped receiver). Consumers must not rely on it for correctness.
//! - **No ordering guarantees** between concurrent publishers.
//! - **No payload authority**: the notice only says *something changed*; the
//!   persisted files remain the source of truth and are re-read in full.
//!
//! Missed notices are acceptable because the store also runs a periodic
//! refresh worker that re-reads storage regardless of delivery.

use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a broadcast channel.
///
/// Each subscription gets a copy of every notice published after it was
/// created (broadcast semantics). Subscriptions are designed for
/// single-threaded consumption; use one per listener thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a notice without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a notice.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Transport-agnostic broadcast channel.
///
/// Implementations must be safe to share across threads; multiple writers may
/// publish concurrently. `publish()` failures are surfaced to the caller, which
/// may ignore them: the polling fallback covers missed invalidations.
pub trait BroadcastChannel<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, notice: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> BroadcastChannel<M> for std::sync::Arc<B>
where
    B: BroadcastChannel<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, notice: M) -> Result<(), Self::Error> {
        (**self).publish(notice)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
