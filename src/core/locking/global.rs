//! Single process-wide lock
//!
//! Every transfer serializes on one mutex. There is only one lock, so there is
//! no ordering to get wrong, at the cost of serializing transfers that share no
//! account. Useful as a baseline for the other strategies.

use std::time::Duration;

use parking_lot::Mutex;

use super::acquire;
use crate::core::traits::LockingStrategy;
use crate::types::TransferError;

#[derive(Debug, Default)]
pub struct GlobalLock {
    lock: Mutex<()>,
    acquire_timeout: Option<Duration>,
}

impl GlobalLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the acquisition to `timeout` (`None` waits forever)
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

impl LockingStrategy for GlobalLock {
    fn with_two_locks<T, F>(&self, first: &str, second: &str, body: F) -> Result<T, TransferError>
    where
        F: FnOnce() -> Result<T, TransferError>,
    {
        if first == second {
            return Err(TransferError::self_transfer(first));
        }

        let _guard = acquire(&self.lock, first, self.acquire_timeout)?;
        body()
    }
}
