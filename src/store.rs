//! Balance store - authoritative point state per user
//!
//! Key-value mapping from user id to the current `UserPoint`. The store
//! has NO locking responsibility for read-modify-write sequences:
//! callers MUST hold the per-user serialization slot before `write`.
//! The in-memory implementation still carries its own RwLock so plain
//! reads outside the slot are safe.

use std::sync::RwLock;

use chrono::Utc;
use rustc_hash::FxHashMap;

use crate::core_types::{Amount, UserId};
use crate::point::UserPoint;

/// Read/write contract for point balances.
///
/// Production and test implementations satisfy the same trait, so the
/// ledger service can be exercised against either without changes.
pub trait PointStore: Send + Sync {
    /// Explicit lookup: `None` when no record was ever written for the
    /// id. A zero-balance record and a missing record are distinct.
    fn find(&self, user_id: UserId) -> Option<UserPoint>;

    /// Point-in-time read. Never fails: unknown ids read as a lazily
    /// created zero balance.
    fn read(&self, user_id: UserId) -> UserPoint {
        self.find(user_id)
            .unwrap_or_else(|| UserPoint::empty(user_id))
    }

    /// Unconditional overwrite, stamped with the current time.
    /// Returns the stored snapshot.
    fn write(&self, user_id: UserId, point: Amount) -> UserPoint;
}

/// In-memory store backed by an FxHashMap.
pub struct MemoryPointStore {
    points: RwLock<FxHashMap<UserId, UserPoint>>,
}

impl MemoryPointStore {
    pub fn new() -> Self {
        Self {
            points: RwLock::new(FxHashMap::default()),
        }
    }

    /// Store pre-populated with explicit records, one write per entry.
    /// A seeded zero balance counts as an existing user.
    pub fn seeded(users: impl IntoIterator<Item = (UserId, Amount)>) -> Self {
        let store = Self::new();
        for (user_id, point) in users {
            store.write(user_id, point);
        }
        store
    }
}

impl Default for MemoryPointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PointStore for MemoryPointStore {
    fn find(&self, user_id: UserId) -> Option<UserPoint> {
        self.points
            .read()
            .expect("point store lock poisoned")
            .get(&user_id)
            .copied()
    }

    fn write(&self, user_id: UserId, point: Amount) -> UserPoint {
        let updated = UserPoint::new(user_id, point, Utc::now());
        self.points
            .write()
            .expect("point store lock poisoned")
            .insert(user_id, updated);
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_unknown_is_none() {
        let store = MemoryPointStore::new();
        assert_eq!(store.find(42), None);
    }

    #[test]
    fn test_read_unknown_is_lazy_zero() {
        let store = MemoryPointStore::new();
        let p = store.read(42);
        assert_eq!(p.user_id(), 42);
        assert_eq!(p.point(), 0);
        // Lazy zero is synthesized, not persisted
        assert_eq!(store.find(42), None);
    }

    #[test]
    fn test_write_then_find() {
        let store = MemoryPointStore::new();
        let before = Utc::now();
        let written = store.write(1, 500);

        assert_eq!(written.point(), 500);
        assert!(written.updated_at() >= before);
        assert_eq!(store.find(1), Some(written));
        assert_eq!(store.read(1), written);
    }

    #[test]
    fn test_write_overwrites_unconditionally() {
        let store = MemoryPointStore::new();
        store.write(1, 500);
        let updated = store.write(1, 30);
        assert_eq!(store.read(1).point(), 30);
        assert_eq!(updated.point(), 30);
    }

    #[test]
    fn test_seeded_zero_balance_exists() {
        let store = MemoryPointStore::seeded([(1, 0), (2, 250)]);
        assert_eq!(store.find(1).map(|p| p.point()), Some(0));
        assert_eq!(store.find(2).map(|p| p.point()), Some(250));
        assert_eq!(store.find(3), None);
    }
}
