//! Rust Transfer Engine CLI
//!
//! Command-line interface for executing account-to-account transfers from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.csv transfers.csv > balances.csv
//! cargo run -- --strategy sync accounts.csv transfers.csv > balances.csv
//! cargo run -- --locking striped --stripes 16 accounts.csv transfers.csv > balances.csv
//! cargo run -- --workers 8 --batch-size 2000 --lock-timeout-ms 500 accounts.csv transfers.csv
//! ```
//!
//! The program seeds the account store from the accounts CSV, executes every
//! transfer from the transfers CSV through the selected strategy, and writes
//! the final balances to stdout. Logs go to stderr; set `RUST_LOG` to change
//! the level.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, malformed accounts file, etc.)

use rust_transfer_engine::{cli, logging, strategy};
use std::process;
use tracing::error;

fn main() {
    logging::init_logging();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    let strategy = strategy::create_strategy(args.strategy.clone(), Some(args.to_run_config()));

    // Balances go to stdout
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.accounts_file, &args.transfers_file, &mut output) {
        error!("{}", e);
        process::exit(1);
    }
}
