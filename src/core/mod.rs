//! Core transfer components
//!
//! This module contains the concurrency-control and domain components:
//! - `traits` - The `AccountStore` and `LockingStrategy` seams
//! - `account_store` - Thread-safe in-memory account storage
//! - `lock_registry` - Memoized one-lock-per-account registry
//! - `locking` - Two-account locking strategies (ordered, striped, global)
//! - `transfer_operation` - Lock-free transfer logic
//! - `coordinator` - The transfer entry point composing the two

pub mod account_store;
pub mod coordinator;
pub mod lock_registry;
pub mod locking;
pub mod traits;
pub mod transfer_operation;

pub use account_store::InMemoryAccountStore;
pub use coordinator::TransferCoordinator;
pub use lock_registry::{LockHandle, LockRegistry};
pub use locking::{AnyLocking, GlobalLock, LockingKind, OrderedLockAcquirer, StripedLockPool};
pub use traits::{AccountStore, LockingStrategy};
pub use transfer_operation::TransferOperation;
