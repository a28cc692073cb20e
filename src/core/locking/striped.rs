//! Fixed-size pool of striped locks
//!
//! Accounts are mapped onto `stripes` mutexes by hashing their id. Memory stays
//! bounded no matter how many distinct ids are seen, in exchange for a small
//! false-contention rate: two unrelated accounts landing on the same stripe
//! serialize each other.
//!
//! Acquisition order is the stripe index, which depends only on the id and on
//! the hasher state chosen at construction. Two distinct ids that share a
//! stripe take that stripe once.

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{trace, warn};

use super::acquire;
use crate::core::traits::LockingStrategy;
use crate::types::TransferError;

/// Default number of stripes
pub const DEFAULT_STRIPES: usize = 64;

#[derive(Debug)]
pub struct StripedLockPool {
    stripes: Vec<Mutex<()>>,
    // Fixed for the lifetime of the pool; changing it would change the lock order
    hasher: RandomState,
    acquire_timeout: Option<Duration>,
}

impl StripedLockPool {
    /// Create a pool of `stripes` locks
    ///
    /// Zero stripes falls back to [`DEFAULT_STRIPES`].
    pub fn new(stripes: usize) -> Self {
        let stripes = if stripes == 0 {
            warn!(
                "Invalid stripe count ({}), using default ({})",
                stripes, DEFAULT_STRIPES
            );
            DEFAULT_STRIPES
        } else {
            stripes
        };

        Self {
            stripes: (0..stripes).map(|_| Mutex::new(())).collect(),
            hasher: RandomState::new(),
            acquire_timeout: None,
        }
    }

    /// Bound each lock acquisition to `timeout` (`None` waits forever)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Stripe guarding `id`
    pub fn stripe_index(&self, id: &str) -> usize {
        (self.hasher.hash_one(id) % self.stripes.len() as u64) as usize
    }
}

impl Default for StripedLockPool {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

impl LockingStrategy for StripedLockPool {
    fn with_two_locks<T, F>(&self, first: &str, second: &str, body: F) -> Result<T, TransferError>
    where
        F: FnOnce() -> Result<T, TransferError>,
    {
        if first == second {
            return Err(TransferError::self_transfer(first));
        }

        let first_idx = self.stripe_index(first);
        let second_idx = self.stripe_index(second);

        if first_idx == second_idx {
            let _guard = acquire(&self.stripes[first_idx], first, self.acquire_timeout)?;
            trace!(stripe = first_idx, "holding shared stripe");
            return body();
        }

        let ((low_idx, low), (high_idx, high)) = if first_idx < second_idx {
            ((first_idx, first), (second_idx, second))
        } else {
            ((second_idx, second), (first_idx, first))
        };

        let _low_guard = acquire(&self.stripes[low_idx], low, self.acquire_timeout)?;
        let _high_guard = acquire(&self.stripes[high_idx], high, self.acquire_timeout)?;
        trace!(low_idx, high_idx, "holding stripes");

        body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_zero_stripes_falls_back_to_default() {
        let pool = StripedLockPool::new(0);
        assert_eq!(pool.stripe_count(), DEFAULT_STRIPES);
    }

    #[test]
    fn test_stripe_index_is_stable() {
        let pool = StripedLockPool::new(16);

        let index = pool.stripe_index("samsung");

        for _ in 0..100 {
            assert_eq!(pool.stripe_index("samsung"), index);
        }
        assert!(index < 16);
    }

    #[test]
    fn test_single_stripe_locks_once() {
        // Every id shares the only stripe; locking it twice would hang
        let pool = StripedLockPool::new(1);

        let result = pool.with_two_locks("samsung", "lotte", || {
            assert!(pool.stripes[0].is_locked());
            Ok(7)
        });

        assert_eq!(result, Ok(7));
        assert!(!pool.stripes[0].is_locked());
    }

    #[test]
    fn test_both_stripes_held_during_body() {
        let pool = StripedLockPool::new(1024);
        // Find two ids on different stripes
        let first = "acct-0".to_string();
        let second = (1..)
            .map(|i| format!("acct-{}", i))
            .find(|id| pool.stripe_index(id) != pool.stripe_index(&first))
            .unwrap();

        pool.with_two_locks(&first, &second, || {
            assert!(pool.stripes[pool.stripe_index(&first)].is_locked());
            assert!(pool.stripes[pool.stripe_index(&second)].is_locked());
            Ok(())
        })
        .unwrap();

        assert!(pool.stripes.iter().all(|stripe| !stripe.is_locked()));
    }

    #[rstest]
    #[case::shared_stripe(1)]
    #[case::separate_stripes(1024)]
    fn test_stripes_released_when_body_fails(#[case] stripes: usize) {
        let pool = StripedLockPool::new(stripes);

        let result: Result<(), TransferError> = pool.with_two_locks("samsung", "lotte", || {
            Err(TransferError::insufficient_funds("samsung", 0, 10))
        });

        assert_eq!(
            result,
            Err(TransferError::insufficient_funds("samsung", 0, 10))
        );
        assert!(pool.stripes.iter().all(|stripe| !stripe.is_locked()));
    }

    #[test]
    fn test_opposite_directions_do_not_deadlock() {
        let pool = Arc::new(StripedLockPool::new(4));
        let (tx, rx) = mpsc::channel();

        for i in 0..32 {
            let pool_clone = Arc::clone(&pool);
            let tx_clone = tx.clone();
            thread::spawn(move || {
                let (a, b) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
                for _ in 0..100 {
                    pool_clone.with_two_locks(a, b, || Ok(())).unwrap();
                }
                tx_clone.send(()).unwrap();
            });
        }
        drop(tx);

        for _ in 0..32 {
            rx.recv_timeout(Duration::from_secs(5))
                .expect("transfers deadlocked");
        }
    }
}
