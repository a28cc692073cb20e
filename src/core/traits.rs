//! Core traits for account storage and concurrency control
//!
//! These two seams keep the transfer logic and the locking protocol
//! independent of each other: `TransferOperation` depends only on an
//! `AccountStore`, and `TransferCoordinator` combines it with any
//! `LockingStrategy`.

use crate::types::{Account, Balance, TransferError};

/// Keyed balance storage
///
/// Implementations take `&self` and must be `Send + Sync` so one store can be
/// shared by every worker thread. Callers only mutate an account while holding
/// that account's lock, so the store itself does not need to serialize
/// read-modify-write sequences.
pub trait AccountStore: Send + Sync {
    /// Get the current snapshot for an account
    ///
    /// Returns `TransferError::UnknownAccount` if the id is absent.
    fn find_by_id(&self, id: &str) -> Result<Account, TransferError>;

    /// Replace the account's snapshot with a new one holding `balance`
    fn save(&self, id: &str, balance: Balance);
}

/// Mutual exclusion over a pair of accounts
///
/// Implementations must acquire locks in an order that is fixed for the
/// lifetime of the strategy, so that no two callers can wait on each other in
/// a cycle. Every lock taken is released before `with_two_locks` returns,
/// whether `body` succeeded, failed or panicked.
pub trait LockingStrategy: Send + Sync {
    /// Run `body` while holding exclusive access to both `first` and `second`
    ///
    /// Passing the same id twice is rejected with
    /// `TransferError::InvalidOperation` before any lock is taken.
    fn with_two_locks<T, F>(&self, first: &str, second: &str, body: F) -> Result<T, TransferError>
    where
        F: FnOnce() -> Result<T, TransferError>;
}
