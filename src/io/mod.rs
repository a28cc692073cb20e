//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, account loading, output)
//! - `sync_reader` - Synchronous transfers reader with iterator interface
//! - `async_reader` - Asynchronous transfers reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_transfer_record, read_accounts, write_balances_csv, AccountCsvRecord,
    TransferCsvRecord,
};
pub use sync_reader::SyncReader;
