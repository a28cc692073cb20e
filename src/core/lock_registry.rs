//! Per-account lock registry
//!
//! Hands out exactly one `LockHandle` per account id for the lifetime of the
//! registry. Handles are created lazily on first request and never removed,
//! so memory grows with the number of distinct ids ever seen. Use
//! `StripedLockPool` when the id space is unbounded.
//!
//! # Thread Safety
//!
//! Insertion goes through `DashMap::entry`, which holds the shard's write lock
//! while checking for and inserting the handle. Concurrent first-time callers
//! for the same id therefore all observe the single handle that won the race.
//! The shard lock is internal to the map and is never held across the
//! business-level lock.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::types::AccountId;

/// Exclusive lock bound to one account id
///
/// The mutex guards no data; it only marks ownership of the account for the
/// duration of a critical section.
pub type LockHandle = Arc<Mutex<()>>;

/// Memoized map of account id to its lock handle
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<AccountId, LockHandle>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock handle for `id`, creating it on first use
    ///
    /// Repeated calls with the same id return clones of the same `Arc`,
    /// including when the first calls race each other.
    pub fn acquire_handle(&self, id: &str) -> LockHandle {
        // Fast path: shared shard lock only
        if let Some(handle) = self.locks.get(id) {
            return Arc::clone(handle.value());
        }

        Arc::clone(
            self.locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Number of handles created so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_acquire_handle_creates_on_first_use() {
        let registry = LockRegistry::new();
        assert!(registry.is_empty());

        let _handle = registry.acquire_handle("samsung");

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_acquire_handle_returns_same_instance() {
        let registry = LockRegistry::new();

        let first = registry.acquire_handle("samsung");
        let second = registry.acquire_handle("samsung");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_ids_get_distinct_handles() {
        let registry = LockRegistry::new();

        let samsung = registry.acquire_handle("samsung");
        let lotte = registry.acquire_handle("lotte");

        assert!(!Arc::ptr_eq(&samsung, &lotte));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_handle_is_exclusive() {
        let registry = LockRegistry::new();
        let handle = registry.acquire_handle("samsung");

        let guard = handle.lock();
        assert!(registry.acquire_handle("samsung").try_lock().is_none());
        drop(guard);
        assert!(registry.acquire_handle("samsung").try_lock().is_some());
    }

    #[test]
    fn test_concurrent_first_access_yields_one_handle() {
        let registry = Arc::new(LockRegistry::new());
        let barrier = Arc::new(Barrier::new(16));
        let mut handles = vec![];

        // All threads request a never-seen id at the same moment
        for _ in 0..16 {
            let registry_clone = Arc::clone(&registry);
            let barrier_clone = Arc::clone(&barrier);
            let handle = thread::spawn(move || {
                barrier_clone.wait();
                registry_clone.acquire_handle("fresh")
            });
            handles.push(handle);
        }

        let results: Vec<LockHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        for handle in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], handle));
        }
    }
}
