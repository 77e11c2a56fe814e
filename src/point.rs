//! ENFORCED POINT TYPE - used by the ledger service
//!
//! This is the SINGLE source of truth for point arithmetic.
//! ALL balance computations MUST go through these methods.
//!
//! # Enforcement Strategy:
//! 1. Fields are PRIVATE - no direct access
//! 2. All arithmetic returns Result - errors are explicit
//! 3. checked_add/sub - overflow/underflow protection
//! 4. Type system prevents bypassing validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, UserId};

/// Arithmetic errors on a point balance.
///
/// These are state guards, not request validation: the service maps
/// them into its own error taxonomy before they reach a caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PointOpError {
    #[error("point overflow")]
    Overflow,

    #[error("insufficient point: have {have}, requested {requested}")]
    Insufficient { have: Amount, requested: Amount },
}

/// Point balance snapshot for a single user.
///
/// # Invariants (ENFORCED by private fields):
/// - `point` is non-negative (unsigned, deduct checks before subtracting)
/// - `user_id` is immutable after creation
/// - A user with no prior record reads as `UserPoint::empty` (point = 0)
///
/// A `UserPoint` is a value, not a live handle: the store owns the
/// authoritative state and stamps `updated_at` on every write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPoint {
    user_id: UserId,
    point: Amount,
    updated_at: DateTime<Utc>,
}

impl UserPoint {
    /// Snapshot with an explicit point value and timestamp.
    pub fn new(user_id: UserId, point: Amount, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            point,
            updated_at,
        }
    }

    /// Lazy zero balance for an id the store has never seen.
    ///
    /// This is the explicit default-value constructor: unknown users
    /// read as zero, they are never an error on the read path.
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, 0, Utc::now())
    }

    // ============================================================
    // READ-ONLY GETTERS (safe to expose)
    // ============================================================

    #[inline(always)]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[inline(always)]
    pub const fn point(&self) -> Amount {
        self.point
    }

    #[inline(always)]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ============================================================
    // VALIDATED ARITHMETIC (ENFORCED operations)
    // ============================================================

    /// Compute the balance after a charge.
    ///
    /// # Errors
    /// Returns `PointOpError::Overflow` on u64 overflow (indicates
    /// corrupted state, not a user mistake).
    pub fn charge(&self, amount: Amount) -> Result<Amount, PointOpError> {
        self.point
            .checked_add(amount)
            .ok_or(PointOpError::Overflow)
    }

    /// Compute the balance after a use.
    ///
    /// # Errors
    /// Returns `PointOpError::Insufficient` if `amount` exceeds the
    /// current balance; the balance never goes negative.
    pub fn deduct(&self, amount: Amount) -> Result<Amount, PointOpError> {
        if self.point < amount {
            return Err(PointOpError::Insufficient {
                have: self.point,
                requested: amount,
            });
        }
        self.point
            .checked_sub(amount)
            .ok_or(PointOpError::Overflow)
    }
}

// ============================================================
// TESTS - Prove enforcement works
// ============================================================
