//! Per-user serializer - named mutual exclusion keyed by user id
//!
//! Guarantees at most one in-flight balance mutation per user id while
//! letting unrelated ids proceed in parallel. This is an internal
//! primitive: the only API is `with_lock`.
//!
//! # Why an arena of locks, not one global lock
//!
//! A single global Mutex would serialize the whole ledger and defeat
//! cross-user parallelism. The arena maps each user id to its own
//! async Mutex, created on first use.
//!
//! # Lock lifetime
//!
//! Slots are never removed. Removing a slot while another task holds a
//! clone of its Arc is itself a race; the long-run memory cost is one
//! small allocation per distinct user, bounded for this domain.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::core_types::UserId;

/// Arena of per-user serialization slots.
pub struct UserLocks {
    slots: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Fetch (or lazily create) the slot for a user id.
    /// The DashMap shard guard is dropped before any await.
    fn slot(&self, user_id: UserId) -> Arc<Mutex<()>> {
        self.slots
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `op` while holding the slot for `user_id`.
    ///
    /// Acquisition waits until the previous holder for the SAME id
    /// releases; it never waits on other ids. The guard is scoped to
    /// this call, so every exit path out of `op` (value, error, panic
    /// unwind) releases the slot.
    pub async fn with_lock<F, Fut, T>(&self, user_id: UserId, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self.slot(user_id);
        let _guard = slot.lock().await;
        op().await
    }

    /// Number of distinct user ids that ever acquired a slot.
    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Default for UserLocks {
    fn default() -> Self {
        Self::new()
    }
}
