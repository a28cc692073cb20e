//! Asynchronous batch processing strategy
//!
//! Executes transfers concurrently on a tokio multi-threaded runtime.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── RunConfig (batch_size, workers, locking)
//!     ├── AsyncReader (batch CSV reading)
//!     └── Arc<TransferCoordinator> (shared by every blocking task)
//!         ├── AnyLocking (per-account, striped or global)
//!         └── InMemoryAccountStore
//! ```
//!
//! # Scheduling
//!
//! - Batches are read and executed one after another
//! - Every transfer within a batch runs on its own `spawn_blocking` task, since
//!   lock acquisition blocks the thread
//! - The blocking pool is capped at `workers` threads
//!
//! Transfers within a batch have no ordering guarantee relative to each other.
//! Their combined effect is that of some sequential order, which the account
//! locks enforce; whether an order-dependent transfer (one that needs funds
//! credited by another transfer in the same batch) succeeds is not fixed.

use crate::core::TransferCoordinator;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{seed_store, ProcessingStrategy, RunConfig, RunSummary};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Asynchronous batch processing strategy
#[derive(Debug, Clone, Default)]
pub struct AsyncProcessingStrategy {
    config: RunConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Run transfers concurrently, batch by batch
    ///
    /// Fatal errors (missing files, runtime creation) are returned immediately.
    /// Rejected transfers are logged and processing continues.
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunSummary, String> {
        let store = seed_store(accounts_path)?;
        let coordinator = Arc::new(TransferCoordinator::new(
            Arc::clone(&store),
            self.config.build_locking(),
        ));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .max_blocking_threads(self.config.workers)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let summary = runtime.block_on(async {
            let file = tokio::fs::File::open(transfers_path).await.map_err(|e| {
                format!("Failed to open file '{}': {}", transfers_path.display(), e)
            })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);
            let mut summary = RunSummary::default();

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                debug!(size = batch.len(), "executing batch");

                let mut tasks = Vec::with_capacity(batch.len());
                for request in batch {
                    let coordinator = Arc::clone(&coordinator);
                    tasks.push(tokio::task::spawn_blocking(move || {
                        let outcome = coordinator.execute_request(&request);
                        (request, outcome)
                    }));
                }

                // Wait for the whole batch before reading the next one
                for task in tasks {
                    match task.await {
                        Ok((request, outcome)) => summary.record(&request, outcome),
                        Err(e) => summary.fail(&e),
                    }
                }
            }

            summary.skipped = reader.skipped();
            Ok::<RunSummary, String>(summary)
        })?;

        write_balances_csv(&store.get_all_accounts(), output)?;
        summary.log();

        Ok(summary)
    }
}
