//! Transfer entry point
//!
//! `TransferCoordinator` is the only component callers invoke. It rejects
//! requests that can never succeed before touching any lock, then runs the
//! `TransferOperation` inside the `LockingStrategy`'s two-account critical
//! section.
//!
//! # Architecture
//!
//! ```text
//! TransferCoordinator
//!     ├── LockingStrategy (OrderedLockAcquirer, StripedLockPool, GlobalLock)
//!     └── TransferOperation
//!         └── Arc<AccountStore>
//! ```
//!
//! Swapping the concurrency strategy means choosing a different `L`; the
//! transfer logic and its tests are unaffected.

use std::sync::Arc;

use tracing::debug;

use crate::core::account_store::InMemoryAccountStore;
use crate::core::locking::OrderedLockAcquirer;
use crate::core::traits::{AccountStore, LockingStrategy};
use crate::core::transfer_operation::TransferOperation;
use crate::types::{Balance, TransferError, TransferReceipt, TransferRequest};

/// Composes a locking strategy around the transfer logic
///
/// Safe to share across threads behind an `Arc` when both `S` and `L` are.
#[derive(Debug)]
pub struct TransferCoordinator<S, L> {
    operation: TransferOperation<S>,
    locking: L,
}

impl TransferCoordinator<InMemoryAccountStore, OrderedLockAcquirer> {
    /// Coordinator over an in-memory store with per-account ordered locks
    pub fn in_memory(store: Arc<InMemoryAccountStore>) -> Self {
        Self::new(store, OrderedLockAcquirer::new())
    }
}

impl<S: AccountStore, L: LockingStrategy> TransferCoordinator<S, L> {
    pub fn new(store: Arc<S>, locking: L) -> Self {
        Self {
            operation: TransferOperation::new(store),
            locking,
        }
    }

    /// Move `amount` from `sender` to `receiver`
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` - both balances were written while both account
    ///   locks were held
    /// * `Err(TransferError::InvalidOperation)` - self-transfer or non-positive
    ///   amount; no lock was taken
    /// * `Err(TransferError::UnknownAccount | InsufficientFunds | ArithmeticOverflow)` -
    ///   rejected inside the critical section; nothing was written
    /// * `Err(TransferError::LockTimeout)` - a lock wait bound was exceeded
    ///
    /// All locks are released before this returns, on every path.
    pub fn execute(
        &self,
        amount: Balance,
        sender: &str,
        receiver: &str,
    ) -> Result<TransferReceipt, TransferError> {
        if sender == receiver {
            return Err(TransferError::self_transfer(sender));
        }
        if amount <= 0 {
            return Err(TransferError::non_positive_amount(amount));
        }

        let receipt = self.locking.with_two_locks(sender, receiver, || {
            self.operation.transfer(amount, sender, receiver)
        })?;

        debug!(
            sender,
            receiver,
            amount,
            sender_balance = receipt.sender_balance,
            receiver_balance = receipt.receiver_balance,
            "transfer committed"
        );
        Ok(receipt)
    }

    /// Execute a transfer described by a request record
    pub fn execute_request(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        self.execute(request.amount, &request.sender, &request.receiver)
    }

    /// Current balance of an account, read without taking its lock
    pub fn balance(&self, id: &str) -> Result<Balance, TransferError> {
        Ok(self.operation.store().find_by_id(id)?.balance)
    }

    pub fn store(&self) -> &Arc<S> {
        self.operation.store()
    }

    pub fn locking(&self) -> &L {
        &self.locking
    }
}
