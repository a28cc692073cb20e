//! Synchronous processing strategy
//!
//! Executes transfers one at a time, in file order, on the calling thread.
//! Transfers still go through the configured locking strategy, so the result
//! is the reference outcome the concurrent strategy is compared against.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Transfer execution to `TransferCoordinator`
//! - CSV output to `csv_format::write_balances_csv`

use crate::core::TransferCoordinator;
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{seed_store, ProcessingStrategy, RunConfig, RunSummary};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_engine::strategy::{ProcessingStrategy, RunConfig, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(RunConfig::default());
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("accounts.csv"), Path::new("transfers.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: RunConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunSummary, String> {
        let store = seed_store(accounts_path)?;
        let coordinator = TransferCoordinator::new(Arc::clone(&store), self.config.build_locking());

        let reader = SyncReader::new(transfers_path)?;
        let mut summary = RunSummary::default();

        for result in reader {
            match result {
                Ok(request) => {
                    let outcome = coordinator.execute_request(&request);
                    summary.record(&request, outcome);
                }
                Err(e) => summary.skip(&e),
            }
        }

        write_balances_csv(&store.get_all_accounts(), output)?;
        summary.log();

        Ok(summary)
    }
}
