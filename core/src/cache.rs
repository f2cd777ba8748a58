//! Latest-value cache with change notification.
//!
//! A single slot holding the most recent collection, backed by a
//! `tokio::sync::watch` channel: every subscriber sees the current value on
//! subscription and is woken on each publish. Only the latest value is kept;
//! intermediate snapshots may be skipped by slow subscribers. The channel's
//! internal lock serializes writers, so one `Cache` is safe to share across
//! threads.

use std::sync::Arc;

use tokio::sync::watch;

/// An immutable snapshot of a cached collection.
pub type Snapshot<T> = Arc<Vec<T>>;

/// Read-only view of a cache. Cloning yields an independent subscriber.
pub type Subscription<T> = watch::Receiver<Snapshot<T>>;

#[derive(Debug)]
pub struct Cache<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T> Cache<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx }
    }

    /// Replace the cached collection and notify every subscriber, even if
    /// the new value equals the old one.
    pub fn publish(&self, items: Vec<T>) {
        self.tx.send_replace(Arc::new(items));
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}
