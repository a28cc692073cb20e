//! Transfer-related types for the Rust Transfer Engine
//!
//! Requests arrive from the transfers CSV (or directly from library callers);
//! receipts describe the balances left behind by a successful transfer.

use super::account::{AccountId, Balance};

/// A request to move `amount` from `sender` to `receiver`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Account debited by the transfer
    pub sender: AccountId,

    /// Account credited by the transfer
    pub receiver: AccountId,

    /// Amount to move. Must be strictly positive to be accepted.
    pub amount: Balance,
}

impl TransferRequest {
    pub fn new(
        sender: impl Into<AccountId>,
        receiver: impl Into<AccountId>,
        amount: Balance,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

/// Outcome of a committed transfer
///
/// Balances are the values written while both account locks were held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub amount: Balance,
    /// Sender balance after the debit
    pub sender_balance: Balance,
    /// Receiver balance after the credit
    pub receiver_balance: Balance,
}
