//! History log - append-only audit trail
//!
//! Records every successful charge/use for complete auditability.
//! One record per applied mutation; per-user order matches the order
//! the mutations were applied under the per-user slot.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, SeqNum, UserId};

/// Kind of balance mutation behind a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryOp {
    Charge,
    Use,
}

/// Audit entry for a single successful balance mutation.
/// `seq` is assigned by the log and strictly increases across users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub seq: SeqNum,
    pub user_id: UserId,
    pub amount: Amount,
    pub op: HistoryOp,
    pub timestamp: DateTime<Utc>,
}

/// Append-only log contract.
///
/// `append` must complete before the mutating operation is considered
/// done. A crash between the balance write and the append is a known,
/// documented gap: the balance is authoritative, the trail may miss the
/// final entry.
pub trait HistoryLog: Send + Sync {
    /// Append one record, assigning its sequence number.
    fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        op: HistoryOp,
        timestamp: DateTime<Utc>,
    ) -> HistoryRecord;

    /// Records for one user, in append order.
    fn list_by_user(&self, user_id: UserId) -> Vec<HistoryRecord>;

    /// Total number of records appended so far.
    fn record_count(&self) -> u64;
}

struct LogInner {
    next_seq: SeqNum,
    records: FxHashMap<UserId, Vec<HistoryRecord>>,
    total: u64,
}

/// In-memory history log. Appends happen while the caller holds the
/// per-user slot, so the Mutex here only guards cross-user access.
pub struct MemoryHistoryLog {
    inner: Mutex<LogInner>,
}

impl MemoryHistoryLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LogInner {
                next_seq: 1,
                records: FxHashMap::default(),
                total: 0,
            }),
        }
    }
}

impl Default for MemoryHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog for MemoryHistoryLog {
    fn append(
        &self,
        user_id: UserId,
        amount: Amount,
        op: HistoryOp,
        timestamp: DateTime<Utc>,
    ) -> HistoryRecord {
        let mut inner = self.inner.lock().expect("history log lock poisoned");
        let record = HistoryRecord {
            seq: inner.next_seq,
            user_id,
            amount,
            op,
            timestamp,
        };
        inner.next_seq += 1;
        inner.total += 1;
        inner.records.entry(user_id).or_default().push(record);
        record
    }

    fn list_by_user(&self, user_id: UserId) -> Vec<HistoryRecord> {
        self.inner
            .lock()
            .expect("history log lock poisoned")
            .records
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record_count(&self) -> u64 {
        self.inner.lock().expect("history log lock poisoned").total
    }
}
