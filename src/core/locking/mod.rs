//! Locking strategies for two-account critical sections
//!
//! Every strategy implements [`LockingStrategy`] and differs only in how
//! account ids map onto mutexes:
//!
//! - [`OrderedLockAcquirer`] - one mutex per account id from a [`LockRegistry`],
//!   acquired in lexicographic id order
//! - [`StripedLockPool`] - a fixed pool of mutexes selected by a hash of the id,
//!   acquired in stripe order
//! - [`GlobalLock`] - one mutex for every transfer
//!
//! # Deadlock Freedom
//!
//! Each strategy derives its acquisition order from the ids alone, never from
//! which side is the sender. Two transfers touching the same pair of accounts
//! therefore always contend for the same lock first, and no cycle of waiters
//! can form.
//!
//! # Bounded Wait
//!
//! All strategies accept an optional acquisition timeout. Without one,
//! acquisition blocks indefinitely. With one, each individual lock is awaited
//! for at most that long and a `TransferError::LockTimeout` is returned on
//! expiry; any lock already held is released on the way out.
//!
//! [`LockRegistry`]: crate::core::LockRegistry

pub mod global;
pub mod ordered;
pub mod striped;

pub use global::GlobalLock;
pub use ordered::OrderedLockAcquirer;
pub use striped::StripedLockPool;

use crate::core::traits::LockingStrategy;
use crate::types::TransferError;
use clap::ValueEnum;
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

/// Available locking strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LockingKind {
    /// One lock per account, created lazily
    PerAccount,
    /// A single lock for all transfers
    Global,
    /// A fixed pool of locks keyed by hash of the account id
    Striped,
}

/// Runtime-selected locking strategy
///
/// Lets the runners pick a strategy from configuration while the coordinator
/// stays generic over `LockingStrategy`.
#[derive(Debug)]
pub enum AnyLocking {
    PerAccount(OrderedLockAcquirer),
    Global(GlobalLock),
    Striped(StripedLockPool),
}

impl AnyLocking {
    /// Build the strategy named by `kind`
    ///
    /// `stripes` is only used by [`LockingKind::Striped`].
    pub fn new(kind: LockingKind, stripes: usize, acquire_timeout: Option<Duration>) -> Self {
        match kind {
            LockingKind::PerAccount => {
                AnyLocking::PerAccount(OrderedLockAcquirer::new().with_timeout(acquire_timeout))
            }
            LockingKind::Global => {
                AnyLocking::Global(GlobalLock::new().with_timeout(acquire_timeout))
            }
            LockingKind::Striped => {
                AnyLocking::Striped(StripedLockPool::new(stripes).with_timeout(acquire_timeout))
            }
        }
    }

    pub fn kind(&self) -> LockingKind {
        match self {
            AnyLocking::PerAccount(_) => LockingKind::PerAccount,
            AnyLocking::Global(_) => LockingKind::Global,
            AnyLocking::Striped(_) => LockingKind::Striped,
        }
    }
}

impl LockingStrategy for AnyLocking {
    fn with_two_locks<T, F>(&self, first: &str, second: &str, body: F) -> Result<T, TransferError>
    where
        F: FnOnce() -> Result<T, TransferError>,
    {
        match self {
            AnyLocking::PerAccount(strategy) => strategy.with_two_locks(first, second, body),
            AnyLocking::Global(strategy) => strategy.with_two_locks(first, second, body),
            AnyLocking::Striped(strategy) => strategy.with_two_locks(first, second, body),
        }
    }
}

/// Lock `lock` on behalf of `account`, waiting at most `timeout` if one is set
pub(crate) fn acquire<'a>(
    lock: &'a Mutex<()>,
    account: &str,
    timeout: Option<Duration>,
) -> Result<MutexGuard<'a, ()>, TransferError> {
    match timeout {
        None => Ok(lock.lock()),
        Some(timeout) => lock.try_lock_for(timeout).ok_or_else(|| {
            let waited_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(account, waited_ms, "lock acquisition timed out");
            TransferError::lock_timeout(account, waited_ms)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::per_account(LockingKind::PerAccount)]
    #[case::global(LockingKind::Global)]
    #[case::striped(LockingKind::Striped)]
    fn test_any_locking_kind(#[case] kind: LockingKind) {
        let locking = AnyLocking::new(kind, 8, None);
        assert_eq!(locking.kind(), kind);
    }

    #[rstest]
    fn test_any_locking_runs_body(
        #[values(LockingKind::PerAccount, LockingKind::Global, LockingKind::Striped)]
        kind: LockingKind,
    ) {
        let locking = AnyLocking::new(kind, 8, None);

        let result = locking.with_two_locks("samsung", "lotte", || Ok(42));

        assert_eq!(result, Ok(42));
    }

    #[rstest]
    fn test_any_locking_rejects_self_transfer(
        #[values(LockingKind::PerAccount, LockingKind::Global, LockingKind::Striped)]
        kind: LockingKind,
    ) {
        let locking = AnyLocking::new(kind, 8, None);

        let result: Result<(), TransferError> =
            locking.with_two_locks("samsung", "samsung", || panic!("body must not run"));

        assert_eq!(result, Err(TransferError::self_transfer("samsung")));
    }

    #[test]
    fn test_acquire_without_timeout() {
        let lock = Mutex::new(());

        let guard = acquire(&lock, "samsung", None);

        assert!(guard.is_ok());
        assert!(lock.is_locked());
    }

    #[test]
    fn test_acquire_times_out_when_held() {
        let lock = Mutex::new(());
        let _held = lock.lock();

        let result = acquire(&lock, "samsung", Some(Duration::from_millis(20)));

        assert_eq!(
            result.err(),
            Some(TransferError::lock_timeout("samsung", 20))
        );
    }
}
