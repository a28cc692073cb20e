//! Transfer domain logic
//!
//! `TransferOperation` reads both balances, validates the request, and writes
//! the new balances back. It knows nothing about locking: the caller must hold
//! exclusive access to both accounts for the whole call, which is what
//! `TransferCoordinator` guarantees. Without that, two concurrent calls could
//! read the same sender balance and both commit, losing an update.
//!
//! # Failure Modes
//!
//! Every rejection happens before the first write, so a failed call leaves the
//! store untouched:
//!
//! - Non-positive amount -> `InvalidOperation`
//! - Unknown sender or receiver -> `UnknownAccount`
//! - Sender balance below amount -> `InsufficientFunds`
//! - Receiver balance would overflow -> `ArithmeticOverflow`

use std::sync::Arc;

use crate::core::traits::AccountStore;
use crate::types::{Balance, TransferError, TransferReceipt};

/// Lock-free transfer logic over an `AccountStore`
#[derive(Debug)]
pub struct TransferOperation<S> {
    store: Arc<S>,
}

impl<S> Clone for TransferOperation<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AccountStore> TransferOperation<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Move `amount` from `sender` to `receiver`
    ///
    /// Must only be called while both accounts are locked by the caller.
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReceipt)` with the balances that were written
    /// * `Err(TransferError)` if the transfer was rejected; nothing was written
    pub fn transfer(
        &self,
        amount: Balance,
        sender: &str,
        receiver: &str,
    ) -> Result<TransferReceipt, TransferError> {
        if amount <= 0 {
            return Err(TransferError::non_positive_amount(amount));
        }

        let sender_balance = self.store.find_by_id(sender)?.balance;
        let receiver_balance = self.store.find_by_id(receiver)?.balance;

        if sender_balance < amount {
            return Err(TransferError::insufficient_funds(
                sender,
                sender_balance,
                amount,
            ));
        }

        let new_sender_balance = sender_balance - amount;
        let new_receiver_balance = receiver_balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::arithmetic_overflow("credit", receiver))?;

        self.store.save(sender, new_sender_balance);
        self.store.save(receiver, new_receiver_balance);

        Ok(TransferReceipt {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            sender_balance: new_sender_balance,
            receiver_balance: new_receiver_balance,
        })
    }
}
