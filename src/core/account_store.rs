//! Thread-safe in-memory account storage
//!
//! `InMemoryAccountStore` keeps one `Account` snapshot per id in a `DashMap`.
//! DashMap only protects the individual `get`/`insert` calls; the
//! read-check-write sequence of a transfer is protected by the account locks
//! taken by the `LockingStrategy`.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountId, Balance, TransferError};
use dashmap::DashMap;

/// Concurrent map of account id to its latest snapshot
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryAccountStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Create a store pre-populated with the given opening balances
    ///
    /// Later entries with a repeated id replace earlier ones.
    pub fn with_accounts<I, K>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (K, Balance)>,
        K: Into<AccountId>,
    {
        let store = Self::new();
        for (id, balance) in accounts {
            store.open(id, balance);
        }
        store
    }

    /// Register an account with an opening balance
    ///
    /// Replaces any existing account with the same id.
    pub fn open(&self, id: impl Into<AccountId>, balance: Balance) {
        self.accounts.insert(id.into(), Account::of(balance));
    }

    /// Number of accounts in the store
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every balance in the store
    ///
    /// Only meaningful while no transfer is in flight.
    pub fn total_balance(&self) -> i128 {
        self.accounts
            .iter()
            .map(|entry| i128::from(entry.value().balance))
            .sum()
    }

    /// Snapshot of every account, sorted by id
    ///
    /// The returned values may be stale as soon as this returns if transfers
    /// are still running.
    pub fn get_all_accounts(&self) -> Vec<(AccountId, Account)> {
        let mut accounts: Vec<(AccountId, Account)> = self
            .accounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        accounts.sort_by(|a, b| a.0.cmp(&b.0));
        accounts
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_id(&self, id: &str) -> Result<Account, TransferError> {
        self.accounts
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransferError::unknown_account(id))
    }

    fn save(&self, id: &str, balance: Balance) {
        self.accounts.insert(id.to_string(), Account::of(balance));
    }
}
