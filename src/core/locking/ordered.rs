//! Per-account locks acquired in a fixed global order
//!
//! `OrderedLockAcquirer` resolves both account ids to their handles in a
//! shared [`LockRegistry`] and always locks the lexicographically smaller id
//! first. A transfer A -> B and a concurrent transfer B -> A both start by
//! waiting on `min(A, B)`, so one of them completes before the other can hold
//! anything it needs.
//!
//! Guards are plain RAII values declared in acquisition order. Rust drops
//! locals in reverse declaration order, so the second lock is released before
//! the first on every exit path, including `?` returns and panics in `body`.

use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::acquire;
use crate::core::lock_registry::LockRegistry;
use crate::core::traits::LockingStrategy;
use crate::types::TransferError;

/// Order two distinct ids for acquisition: smaller id first
///
/// This is the one total order every multi-account acquisition follows. It
/// depends only on the ids, never on which of them is the sender.
pub fn lock_order<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Two-account locking over one mutex per account id
#[derive(Debug, Default)]
pub struct OrderedLockAcquirer {
    registry: Arc<LockRegistry>,
    acquire_timeout: Option<Duration>,
}

impl OrderedLockAcquirer {
    /// Create an acquirer with its own empty registry and no wait bound
    pub fn new() -> Self {
        Self::with_registry(Arc::new(LockRegistry::new()))
    }

    /// Create an acquirer over an existing registry
    ///
    /// Acquirers sharing a registry share the same lock per account.
    pub fn with_registry(registry: Arc<LockRegistry>) -> Self {
        Self {
            registry,
            acquire_timeout: None,
        }
    }

    /// Bound each lock acquisition to `timeout` (`None` waits forever)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<LockRegistry> {
        &self.registry
    }
}

impl LockingStrategy for OrderedLockAcquirer {
    fn with_two_locks<T, F>(&self, first: &str, second: &str, body: F) -> Result<T, TransferError>
    where
        F: FnOnce() -> Result<T, TransferError>,
    {
        // A non-reentrant mutex locked twice by one thread never returns
        if first == second {
            return Err(TransferError::self_transfer(first));
        }

        let (low, high) = lock_order(first, second);
        let low_handle = self.registry.acquire_handle(low);
        let high_handle = self.registry.acquire_handle(high);

        let _low_guard = acquire(&low_handle, low, self.acquire_timeout)?;
        let _high_guard = acquire(&high_handle, high, self.acquire_timeout)?;
        trace!(low, high, "holding account locks");

        body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::mpsc;
    use std::thread;

    #[rstest]
    #[case::already_ordered("lotte", "samsung", ("lotte", "samsung"))]
    #[case::reversed("samsung", "lotte", ("lotte", "samsung"))]
    #[case::prefix("acct", "acct-1", ("acct", "acct-1"))]
    #[case::case_sensitive("b", "B", ("B", "b"))]
    fn test_lock_order(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: (&'static str, &'static str),
    ) {
        assert_eq!(lock_order(a, b), expected);
        assert_eq!(lock_order(b, a), expected);
    }

    #[test]
    fn test_body_runs_while_both_locks_held() {
        let acquirer = OrderedLockAcquirer::new();
        let registry = Arc::clone(acquirer.registry());

        let result = acquirer.with_two_locks("samsung", "lotte", || {
            assert!(registry.acquire_handle("samsung").is_locked());
            assert!(registry.acquire_handle("lotte").is_locked());
            Ok("done")
        });

        assert_eq!(result, Ok("done"));
        assert!(!registry.acquire_handle("samsung").is_locked());
        assert!(!registry.acquire_handle("lotte").is_locked());
    }

    #[test]
    fn test_self_transfer_rejected_before_locking() {
        let acquirer = OrderedLockAcquirer::new();

        let result: Result<(), TransferError> =
            acquirer.with_two_locks("samsung", "samsung", || panic!("body must not run"));

        assert_eq!(result, Err(TransferError::self_transfer("samsung")));
        assert!(acquirer.registry().is_empty());
    }

    #[test]
    fn test_locks_released_when_body_fails() {
        let acquirer = OrderedLockAcquirer::new();

        let result: Result<(), TransferError> = acquirer.with_two_locks("samsung", "lotte", || {
            Err(TransferError::insufficient_funds("samsung", 0, 10))
        });

        assert!(result.is_err());
        let registry = acquirer.registry();
        assert!(!registry.acquire_handle("samsung").is_locked());
        assert!(!registry.acquire_handle("lotte").is_locked());
    }

    #[test]
    fn test_locks_released_when_body_panics() {
        let acquirer = Arc::new(OrderedLockAcquirer::new());
        let acquirer_clone = Arc::clone(&acquirer);

        let outcome = thread::spawn(move || {
            let _: Result<(), TransferError> =
                acquirer_clone.with_two_locks("samsung", "lotte", || panic!("boom"));
        })
        .join();

        assert!(outcome.is_err());
        let registry = acquirer.registry();
        assert!(!registry.acquire_handle("samsung").is_locked());
        assert!(!registry.acquire_handle("lotte").is_locked());
    }

    #[test]
    fn test_timeout_when_lock_is_held() {
        let acquirer = OrderedLockAcquirer::new().with_timeout(Some(Duration::from_millis(20)));
        let handle = acquirer.registry().acquire_handle("samsung");
        let _held = handle.lock();

        let result = acquirer.with_two_locks("lotte", "samsung", || Ok(()));

        assert_eq!(result, Err(TransferError::lock_timeout("samsung", 20)));
        // The lower lock taken before the timeout must have been released
        assert!(!acquirer.registry().acquire_handle("lotte").is_locked());
    }

    #[test]
    fn test_opposite_directions_do_not_deadlock() {
        let acquirer = Arc::new(OrderedLockAcquirer::new());
        let (tx, rx) = mpsc::channel();

        for i in 0..64 {
            let acquirer_clone = Arc::clone(&acquirer);
            let tx_clone = tx.clone();
            thread::spawn(move || {
                let (a, b) = if i % 2 == 0 {
                    ("samsung", "lotte")
                } else {
                    ("lotte", "samsung")
                };
                for _ in 0..100 {
                    acquirer_clone.with_two_locks(a, b, || Ok(())).unwrap();
                }
                tx_clone.send(()).unwrap();
            });
        }
        drop(tx);

        for _ in 0..64 {
            rx.recv_timeout(Duration::from_secs(5))
                .expect("transfers deadlocked");
        }
    }

    #[test]
    fn test_disjoint_pair_not_blocked() {
        let acquirer = Arc::new(OrderedLockAcquirer::new());

        let result = acquirer.with_two_locks("a", "b", || {
            let (tx, rx) = mpsc::channel();
            let acquirer_clone = Arc::clone(&acquirer);
            thread::spawn(move || {
                let _ = tx.send(acquirer_clone.with_two_locks("c", "d", || Ok(())));
            });

            Ok(rx.recv_timeout(Duration::from_secs(2)))
        });

        assert_eq!(result, Ok(Ok(Ok(()))));
    }

    #[test]
    fn test_shared_registry_shares_locks() {
        let registry = Arc::new(LockRegistry::new());
        let first = OrderedLockAcquirer::with_registry(Arc::clone(&registry));
        let second = OrderedLockAcquirer::with_registry(Arc::clone(&registry));

        first
            .with_two_locks("samsung", "lotte", || {
                assert!(second.registry().acquire_handle("lotte").is_locked());
                Ok(())
            })
            .unwrap();

        assert_eq!(registry.len(), 2);
    }
}
