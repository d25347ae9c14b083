//! In-process broadcast channel.

use std::sync::{Mutex, mpsc};

use crate::channel::{BroadcastChannel, Subscription};

#[derive(Debug, thiserror::Error)]
pub enum LocalChannelError {
    /// Publish failed due to internal lock poisoning.
    #[error("broadcast channel lock poisoned")]
    Poisoned,
}

/// In-process fan-out channel.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - Dead subscribers are dropped at publish time
#[derive(Debug)]
pub struct LocalChannel<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> LocalChannel<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for LocalChannel<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> BroadcastChannel<M> for LocalChannel<M>
where
    M: Clone + Send + 'static,
{
    type Error = LocalChannelError;

    fn publish(&self, notice: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| LocalChannelError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(notice.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive notices until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
