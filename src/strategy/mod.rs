//! Processing strategy module for batch transfer runs
//!
//! This module defines the Strategy pattern for complete processing pipelines:
//! seed the account store from an accounts CSV, execute every request from a
//! transfers CSV through a `TransferCoordinator`, and write the final balances.
//! Implementations differ in how transfers are scheduled:
//!
//! - `sync` - one transfer at a time, in file order
//! - `async` - batches of transfers executed concurrently on a tokio runtime

use crate::cli::StrategyType;
use crate::core::locking::striped::DEFAULT_STRIPES;
use crate::core::{AnyLocking, InMemoryAccountStore, LockingKind};
use crate::io::read_accounts;
use crate::types::{TransferError, TransferReceipt, TransferRequest};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use std::fmt::Display;
use tracing::{error, info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete transfer runs
pub trait ProcessingStrategy: Send + Sync {
    /// Run every transfer in `transfers_path` against the accounts in
    /// `accounts_path` and write the final balances to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` once every readable transfer has been attempted
    /// * `Err(String)` if a fatal error occurred (missing or malformed accounts
    ///   file, unreadable transfers file, output failure)
    ///
    /// Rejected transfers and malformed transfer rows are logged and counted,
    /// never fatal.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunSummary, String>;
}

/// Configuration shared by all processing strategies
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Number of transfers read per batch (async only)
    pub batch_size: usize,
    /// Number of worker threads executing transfers (async only)
    pub workers: usize,
    /// Locking strategy guarding each transfer
    pub locking: LockingKind,
    /// Pool size for `LockingKind::Striped`
    pub stripes: usize,
    /// Upper bound on each lock wait; `None` waits forever
    pub lock_timeout: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            workers: num_cpus::get(),
            locking: LockingKind::PerAccount,
            stripes: DEFAULT_STRIPES,
            lock_timeout: None,
        }
    }
}

impl RunConfig {
    /// Create a RunConfig with custom values
    ///
    /// A zero `batch_size` or `workers` falls back to the default with a
    /// warning.
    pub fn new(
        batch_size: usize,
        workers: usize,
        locking: LockingKind,
        stripes: usize,
        lock_timeout: Option<Duration>,
    ) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let workers = if workers == 0 {
            warn!(
                "Invalid workers ({}), using default ({})",
                workers, default.workers
            );
            default.workers
        } else {
            workers
        };

        Self {
            batch_size,
            workers,
            locking,
            stripes,
            lock_timeout,
        }
    }

    /// Build the locking strategy this configuration names
    pub fn build_locking(&self) -> AnyLocking {
        AnyLocking::new(self.locking, self.stripes, self.lock_timeout)
    }
}

/// Counts of transfer outcomes for one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Transfers written to the store
    pub committed: usize,
    /// Transfers rejected by the coordinator, or whose task failed to complete
    pub rejected: usize,
    /// Rows that could not be parsed into a transfer request
    pub skipped: usize,
}

impl RunSummary {
    /// Count one coordinator outcome, logging rejections
    pub fn record(
        &mut self,
        request: &TransferRequest,
        result: Result<TransferReceipt, TransferError>,
    ) {
        match result {
            Ok(_) => self.committed += 1,
            Err(e) => {
                warn!(
                    sender = %request.sender,
                    receiver = %request.receiver,
                    amount = request.amount,
                    "Transfer rejected: {}",
                    e
                );
                self.rejected += 1;
            }
        }
    }

    /// Count one transfer whose worker task failed before reporting an outcome
    ///
    /// The transfer never returned a receipt, so it counts as rejected.
    pub fn fail(&mut self, error: &impl Display) {
        error!("Transfer task failed: {}", error);
        self.rejected += 1;
    }

    /// Count one unparseable row
    pub fn skip(&mut self, error: &str) {
        warn!("CSV parsing error: {}", error);
        self.skipped += 1;
    }

    pub fn log(&self) {
        info!(
            committed = self.committed,
            rejected = self.rejected,
            skipped = self.skipped,
            "transfer run complete"
        );
    }
}

/// Load opening balances into a fresh store
pub(crate) fn seed_store(accounts_path: &Path) -> Result<Arc<InMemoryAccountStore>, String> {
    let accounts = read_accounts(accounts_path).map_err(|e| e.to_string())?;
    info!(
        accounts = accounts.len(),
        path = %accounts_path.display(),
        "seeded account store"
    );
    Ok(Arc::new(InMemoryAccountStore::with_accounts(accounts)))
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional run configuration; defaults are used when `None`
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<RunConfig>,
) -> Box<dyn ProcessingStrategy> {
    let config = config.unwrap_or_default();
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config)),
    }
}
