use crate::core::LockingKind;
use crate::strategy::RunConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Execute account-to-account transfers against in-memory balances
#[derive(Parser, Debug)]
#[command(name = "transfer-engine")]
#[command(about = "Execute account-to-account transfers against in-memory balances", long_about = None)]
pub struct CliArgs {
    /// Accounts CSV file path (account,balance)
    #[arg(value_name = "ACCOUNTS", help = "Path to the accounts CSV file")]
    pub accounts_file: PathBuf,

    /// Transfers CSV file path (sender,receiver,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub transfers_file: PathBuf,

    /// Processing strategy used to schedule transfers
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent"
    )]
    pub strategy: StrategyType,

    /// Locking strategy guarding each transfer
    #[arg(
        long = "locking",
        value_name = "LOCKING",
        default_value = "per-account",
        help = "Locking strategy: 'per-account', 'global' or 'striped'"
    )]
    pub locking: LockingKind,

    /// Number of stripes for the striped locking strategy
    #[arg(
        long = "stripes",
        value_name = "COUNT",
        default_value_t = 64,
        help = "Number of lock stripes (striped locking only)"
    )]
    pub stripes: usize,

    /// Number of transfers per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfers per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of threads executing transfers (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Bound on each lock wait in milliseconds
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MS",
        help = "Fail a transfer whose lock wait exceeds this many milliseconds (default: wait forever)"
    )]
    pub lock_timeout_ms: Option<u64>,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a RunConfig from CLI arguments
    ///
    /// Missing values fall back to `RunConfig::default()`; zero values are
    /// replaced by the defaults with a warning.
    pub fn to_run_config(&self) -> RunConfig {
        let default = RunConfig::default();
        RunConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.workers.unwrap_or(default.workers),
            self.locking,
            self.stripes,
            self.lock_timeout_ms.map(Duration::from_millis),
        )
    }
}
