//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - globally unique, immutable after assignment.
///
/// # Usage:
/// - Primary key for point balances and history records
/// - Used in HashMap for O(1) balance lookup
/// - Key of the per-user lock arena
pub type UserId = u64;

/// Point amount - unit-less integer, no fractional part.
///
/// # Constraints:
/// - Balances are non-negative by construction (unsigned)
/// - Per-operation charge amounts are bounded by `max_charge`
pub type Amount = u64;

/// Sequence number assigned by the history log, strictly increasing.
pub type SeqNum = u64;
