//! Rust Transfer Engine Library
//! # Overview
//!
//! This library moves funds between named accounts held in an in-memory
//! store, safely under concurrent callers.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransferRequest, TransferError)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::lock_registry`] - One lock handle per account id, created on first use
//!   - [`core::locking`] - Locking strategies guarding a pair of accounts
//!   - [`core::transfer_operation`] - Validation and balance update, with no locking of its own
//!   - [`core::coordinator`] - Combines a locking strategy with the transfer operation
//!   - [`core::account_store`] - Concurrent in-memory account storage
//! - [`io`] - CSV input and output
//! - [`strategy`] - Sequential and concurrent batch runners
//! - [`logging`] - tracing subscriber setup for the binary
//!
//! # Deadlock Freedom
//!
//! Every transfer touching two accounts takes both account locks in
//! ascending order of account id, whatever the direction of the transfer.
//! Two transfers over the same pair therefore always contend on the same
//! lock first, and no cycle of waiters can form.
//!
//! # Example
//!
//! ```
//! use rust_transfer_engine::{InMemoryAccountStore, TransferCoordinator};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryAccountStore::with_accounts([
//!     ("samsung", 1000),
//!     ("lotte", 1000),
//! ]));
//! let coordinator = TransferCoordinator::in_memory(store);
//!
//! coordinator.execute(10, "samsung", "lotte").unwrap();
//! assert_eq!(coordinator.balance("samsung").unwrap(), 990);
//! assert_eq!(coordinator.balance("lotte").unwrap(), 1010);
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    AccountStore, AnyLocking, InMemoryAccountStore, LockRegistry, LockingKind, LockingStrategy,
    OrderedLockAcquirer, TransferCoordinator, TransferOperation,
};
pub use io::write_balances_csv;
pub use types::{Account, AccountId, Balance, TransferError, TransferReceipt, TransferRequest};
