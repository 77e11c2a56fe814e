//! Point Ledger - Concurrency-Safe Balance Engine
//!
//! A per-user point balance with validated charge/use operations and an
//! append-only audit history. Two concurrent operations on the same
//! user id are applied atomically in a deterministic order; operations
//! on different user ids run in parallel without contention.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, Amount, SeqNum)
//! - [`point`] - Enforced point snapshot with checked arithmetic
//! - [`store`] - Balance store trait + in-memory implementation
//! - [`history`] - Append-only history log trait + in-memory implementation
//! - [`user_lock`] - Per-user serialization slots
//! - [`service`] - Point ledger service (validate, serialize, mutate, audit)
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

// Core types - must be first!
pub mod core_types;

// Ledger components
pub mod history;
pub mod point;
pub mod service;
pub mod store;
pub mod user_lock;

// Ambient
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use config::{AppConfig, LedgerConfig};
pub use core_types::{Amount, SeqNum, UserId};
pub use history::{HistoryLog, HistoryOp, HistoryRecord, MemoryHistoryLog};
pub use point::{PointOpError, UserPoint};
pub use service::{AmountError, DEFAULT_MAX_CHARGE, PointError, PointService};
pub use store::{MemoryPointStore, PointStore};
pub use user_lock::UserLocks;
