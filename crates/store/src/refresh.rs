//! Background synchronization: notice-driven reloads plus a periodic poll.
//!
//! The broadcast channel is best-effort, so a handle that only listened for
//! notices could drift after a missed delivery. The [`RefreshWorker`] re-reads
//! storage on a fixed interval regardless, bounding staleness to one tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use paperstock_broadcast::{BroadcastChannel, Subscription};

use crate::notice::StoreNotice;
use crate::store::StockStore;

/// Polling fallback cadence.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Periodic full reload of the store from disk.
///
/// Dropping the worker stops the thread.
#[derive(Debug)]
pub struct RefreshWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshWorker {
    pub fn spawn<B>(store: Arc<StockStore<B>>) -> Self
    where
        B: BroadcastChannel<StoreNotice> + Send + Sync + 'static,
    {
        Self::spawn_with_interval(store, REFRESH_INTERVAL)
    }

    /// Spawn with a custom interval (tests shrink it).
    pub fn spawn_with_interval<B>(store: Arc<StockStore<B>>, interval: Duration) -> Self
    where
        B: BroadcastChannel<StoreNotice> + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            loop {
                // park_timeout rather than sleep so a stopping drop does not
                // have to wait out a full tick.
                thread::park_timeout(interval);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                if let Err(e) = store.reload_all() {
                    tracing::debug!(error = %e, "periodic refresh left stale collections");
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

/// Reloads the store whenever a notice arrives on the broadcast channel.
///
/// Notices carry no authoritative payload; any notice triggers a full
/// re-read. Dropping the listener stops the thread.
#[derive(Debug)]
pub struct NoticeListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NoticeListener {
    pub fn spawn<B>(store: Arc<StockStore<B>>, subscription: Subscription<StoreNotice>) -> Self
    where
        B: BroadcastChannel<StoreNotice> + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            loop {
                match subscription.recv_timeout(Duration::from_millis(200)) {
                    Ok(notice) => {
                        tracing::debug!(?notice, "notice received; reloading store");
                        if let Err(e) = store.reload_all() {
                            tracing::debug!(error = %e, "notice-driven reload left stale collections");
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if flag.load(Ordering::Relaxed) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for NoticeListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
