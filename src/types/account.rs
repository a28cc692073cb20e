//! Account-related types for the Rust Transfer Engine
//!
//! This module defines the Account snapshot and the identifier and balance
//! types shared by the store, the lock registry and the transfer logic.

use chrono::{DateTime, Utc};

/// Account identifier
///
/// Identifiers are compared with `String`'s lexicographic ordering, which is
/// also the global lock acquisition order.
pub type AccountId = String;

/// Account balance
///
/// Signed so that a prospective debit can be computed and rejected before it
/// is ever written. Stored balances are never negative.
pub type Balance = i64;

/// Immutable snapshot of one ledger entry
///
/// A write never mutates a shared `Account`; the store replaces the whole
/// value with a fresh snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Current balance
    pub balance: Balance,

    /// Time of the last write
    ///
    /// Informational only. It is not consulted for concurrency control.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a snapshot holding `balance`, stamped with the current time
    pub fn of(balance: Balance) -> Self {
        Account {
            balance,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_sets_balance_and_timestamp() {
        let before = Utc::now();
        let account = Account::of(1000);
        let after = Utc::now();

        assert_eq!(account.balance, 1000);
        assert!(account.updated_at >= before);
        assert!(account.updated_at <= after);
    }

    #[test]
    fn test_snapshots_are_independent_values() {
        let original = Account::of(500);
        let mut copy = original.clone();
        copy.balance = 0;

        assert_eq!(original.balance, 500);
    }
}
