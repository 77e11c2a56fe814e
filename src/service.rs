//! Point ledger service - validated, serialized balance mutations
//!
//! The single orchestrator for ALL balance operations.
//!
//! # Responsibilities
//!
//! 1. **Request validation** - existence, positivity, per-op bound
//! 2. **Serialized mutation** - read-validate-write-append under the
//!    per-user slot
//! 3. **Audit** - one history record per applied mutation
//!
//! # Data Flow
//!
//! ```text
//! charge/use → validate → with_lock(user_id) → read → compute
//!                                    ↓
//!                              write → append → UserPoint
//! ```
//!
//! # Concurrency
//!
//! Same-id operations are strictly serialized: the previous holder's
//! write AND history append complete before the next body runs. The
//! final balance is the initial balance plus every accepted delta in
//! slot-acquisition order; no delta is ever lost. Distinct ids never
//! contend.

use tracing::{debug, info, warn};

use crate::core_types::{Amount, UserId};
use crate::history::{HistoryLog, HistoryOp, HistoryRecord};
use crate::point::{PointOpError, UserPoint};
use crate::store::PointStore;
use crate::user_lock::UserLocks;

/// Per-operation charge/use bound when none is configured.
pub const DEFAULT_MAX_CHARGE: Amount = 1_000;

// ============================================================
// ERROR TAXONOMY
// ============================================================

/// Amount validation failures, detected before any state is touched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be positive")]
    NotPositive,

    #[error("amount must be within (0, {max}]: got {got}")]
    OutOfRange { max: Amount, got: Amount },
}

/// Request-rejection errors surfaced to the caller.
///
/// All variants leave state unchanged and are never retried
/// internally. The (out-of-scope) request layer maps them onto
/// transport responses.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointError {
    /// The store holds no explicit record for this id. A zero-balance
    /// record counts as existing; a never-written id does not.
    #[error("user {user_id} does not exist")]
    UserNotFound { user_id: UserId },

    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    #[error("insufficient point for user {user_id}: have {have}, requested {requested}")]
    InsufficientFunds {
        user_id: UserId,
        have: Amount,
        requested: Amount,
    },

    /// State guard: the balance would exceed u64. Unreachable through
    /// bounded charges short of 2^64 points.
    #[error("point balance overflow for user {user_id}")]
    BalanceOverflow { user_id: UserId },
}

// ============================================================
// SERVICE
// ============================================================

/// Point ledger service, generic over its collaborators.
///
/// The store and history log are injected at construction; production
/// and test implementations satisfy the same traits. The service never
/// caches a balance across calls - every mutation re-reads under the
/// slot, because validation depends on the latest value.
pub struct PointService<S, H> {
    store: S,
    history: H,
    locks: UserLocks,
    max_charge: Amount,
}

impl<S: PointStore, H: HistoryLog> PointService<S, H> {
    pub fn new(store: S, history: H) -> Self {
        Self::with_max_charge(store, history, DEFAULT_MAX_CHARGE)
    }

    pub fn with_max_charge(store: S, history: H, max_charge: Amount) -> Self {
        Self {
            store,
            history,
            locks: UserLocks::new(),
            max_charge,
        }
    }

    /// Increase a user's balance by a validated amount.
    ///
    /// # Errors
    /// - `UserNotFound` if the store has no explicit record for the id
    /// - `InvalidAmount` if `amount` is zero or above `max_charge`
    /// - `BalanceOverflow` on u64 overflow (state guard)
    pub async fn charge(&self, user_id: UserId, amount: Amount) -> Result<UserPoint, PointError> {
        self.require_user(user_id)?;
        self.validate_amount(user_id, amount)?;

        self.locks
            .with_lock(user_id, || async move {
                let current = self.store.read(user_id);
                let new_point = current
                    .charge(amount)
                    .map_err(|_| PointError::BalanceOverflow { user_id })?;

                let updated = self.store.write(user_id, new_point);
                self.history
                    .append(user_id, amount, HistoryOp::Charge, updated.updated_at());

                info!(user_id, amount, point = updated.point(), "point charged");
                Ok(updated)
            })
            .await
    }

    /// Decrease a user's balance by a validated amount, bounded by the
    /// current balance.
    ///
    /// The sufficiency check runs AFTER slot acquisition: a caller that
    /// waited on the slot re-validates against the latest balance
    /// rather than trusting anything observed while queued.
    ///
    /// # Errors
    /// - `UserNotFound` if the store has no explicit record for the id
    /// - `InvalidAmount` if `amount` is zero or above `max_charge`
    /// - `InsufficientFunds` if `amount` exceeds the current balance
    pub async fn use_points(
        &self,
        user_id: UserId,
        amount: Amount,
    ) -> Result<UserPoint, PointError> {
        self.require_user(user_id)?;
        self.validate_amount(user_id, amount)?;

        self.locks
            .with_lock(user_id, || async move {
                let current = self.store.read(user_id);
                let new_point = current.deduct(amount).map_err(|e| match e {
                    PointOpError::Insufficient { have, requested } => {
                        warn!(user_id, have, requested, "use rejected: insufficient point");
                        PointError::InsufficientFunds {
                            user_id,
                            have,
                            requested,
                        }
                    }
                    PointOpError::Overflow => PointError::BalanceOverflow { user_id },
                })?;

                let updated = self.store.write(user_id, new_point);
                self.history
                    .append(user_id, amount, HistoryOp::Use, updated.updated_at());

                info!(user_id, amount, point = updated.point(), "point used");
                Ok(updated)
            })
            .await
    }

    /// Current balance snapshot. Unknown ids read as a zero balance,
    /// never an error.
    pub fn get_balance(&self, user_id: UserId) -> UserPoint {
        self.store.read(user_id)
    }

    /// Audit trail for one user, in applied order.
    pub fn get_history(&self, user_id: UserId) -> Vec<HistoryRecord> {
        self.history.list_by_user(user_id)
    }

    fn require_user(&self, user_id: UserId) -> Result<(), PointError> {
        if self.store.find(user_id).is_none() {
            debug!(user_id, "operation rejected: unknown user");
            return Err(PointError::UserNotFound { user_id });
        }
        Ok(())
    }

    fn validate_amount(&self, user_id: UserId, amount: Amount) -> Result<(), AmountError> {
        if amount == 0 {
            debug!(user_id, "operation rejected: amount not positive");
            return Err(AmountError::NotPositive);
        }
        if amount > self.max_charge {
            debug!(
                user_id,
                amount,
                max = self.max_charge,
                "operation rejected: amount out of range"
            );
            return Err(AmountError::OutOfRange {
                max: self.max_charge,
                got: amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryLog;
    use crate::store::MemoryPointStore;

    fn service_with(
        users: impl IntoIterator<Item = (UserId, Amount)>,
    ) -> PointService<MemoryPointStore, MemoryHistoryLog> {
        PointService::new(MemoryPointStore::seeded(users), MemoryHistoryLog::new())
    }

    #[tokio::test]
    async fn test_charge_unknown_user_fails_without_write() {
        let svc = service_with([]);

        let err = svc.charge(1, 500).await.unwrap_err();
        assert_eq!(err, PointError::UserNotFound { user_id: 1 });
        assert_eq!(err.to_string(), "user 1 does not exist");

        // No write, no history
        assert_eq!(svc.get_balance(1).point(), 0);
        assert!(svc.get_history(1).is_empty());
    }

    #[tokio::test]
    async fn test_charge_zero_amount_fails() {
        let svc = service_with([(1, 0)]);

        let err = svc.charge(1, 0).await.unwrap_err();
        assert_eq!(err, PointError::InvalidAmount(AmountError::NotPositive));
        assert_eq!(err.to_string(), "amount must be positive");
        assert!(svc.get_history(1).is_empty());
    }

    #[tokio::test]
    async fn test_charge_above_bound_fails() {
        let svc = service_with([(1, 0)]);

        let err = svc.charge(1, 1001).await.unwrap_err();
        assert_eq!(
            err,
            PointError::InvalidAmount(AmountError::OutOfRange {
                max: 1000,
                got: 1001
            })
        );
        assert_eq!(err.to_string(), "amount must be within (0, 1000]: got 1001");
        assert_eq!(svc.get_balance(1).point(), 0);
    }

    #[tokio::test]
    async fn test_charge_success_appends_one_record() {
        let svc = service_with([(1, 500)]);

        let updated = svc.charge(1, 100).await.unwrap();
        assert_eq!(updated.point(), 600);
        assert_eq!(svc.get_balance(1).point(), 600);

        let records = svc.get_history(1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 100);
        assert_eq!(records[0].op, HistoryOp::Charge);
    }

    #[tokio::test]
    async fn test_charge_at_bound_succeeds() {
        let svc = service_with([(1, 0)]);
        assert_eq!(svc.charge(1, 1000).await.unwrap().point(), 1000);
    }

    #[tokio::test]
    async fn test_use_unknown_user_fails() {
        let svc = service_with([]);
        let err = svc.use_points(1, 100).await.unwrap_err();
        assert_eq!(err, PointError::UserNotFound { user_id: 1 });
    }

    #[tokio::test]
    async fn test_use_zero_amount_fails() {
        let svc = service_with([(1, 500)]);
        let err = svc.use_points(1, 0).await.unwrap_err();
        assert_eq!(err, PointError::InvalidAmount(AmountError::NotPositive));
        assert_eq!(svc.get_balance(1).point(), 500);
    }

    #[tokio::test]
    async fn test_use_beyond_balance_fails_without_write() {
        let svc = service_with([(1, 50)]);

        let err = svc.use_points(1, 100).await.unwrap_err();
        assert_eq!(
            err,
            PointError::InsufficientFunds {
                user_id: 1,
                have: 50,
                requested: 100
            }
        );
        assert_eq!(svc.get_balance(1).point(), 50);
        assert!(svc.get_history(1).is_empty());
    }

    #[tokio::test]
    async fn test_use_success_appends_use_record() {
        let svc = service_with([(1, 500)]);

        let updated = svc.use_points(1, 200).await.unwrap();
        assert_eq!(updated.point(), 300);

        let records = svc.get_history(1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].op, HistoryOp::Use);
        assert_eq!(records[0].amount, 200);
    }

    #[tokio::test]
    async fn test_use_entire_balance_reaches_zero() {
        let svc = service_with([(1, 300)]);
        assert_eq!(svc.use_points(1, 300).await.unwrap().point(), 0);
        // A zero-balance record still exists
        assert_eq!(svc.charge(1, 10).await.unwrap().point(), 10);
    }

    #[tokio::test]
    async fn test_get_balance_unknown_is_lazy_zero() {
        let svc = service_with([]);
        let p = svc.get_balance(7);
        assert_eq!(p.user_id(), 7);
        assert_eq!(p.point(), 0);
    }

    #[tokio::test]
    async fn test_custom_max_charge_bound() {
        let svc = PointService::with_max_charge(
            MemoryPointStore::seeded([(1, 0)]),
            MemoryHistoryLog::new(),
            200,
        );
        assert!(svc.charge(1, 200).await.is_ok());
        let err = svc.charge(1, 201).await.unwrap_err();
        assert_eq!(
            err,
            PointError::InvalidAmount(AmountError::OutOfRange { max: 200, got: 201 })
        );
    }

    #[tokio::test]
    async fn test_failed_validation_leaves_no_history() {
        let svc = service_with([(1, 100)]);
        let _ = svc.charge(1, 0).await;
        let _ = svc.charge(1, 5000).await;
        let _ = svc.use_points(1, 500).await;
        assert!(svc.get_history(1).is_empty());
        assert_eq!(svc.get_balance(1).point(), 100);
    }
}
