//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account snapshots, identifiers and balances
//! - `transfer`: Transfer requests and receipts
//! - `error`: Error types for the transfer engine

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, Balance};
pub use error::TransferError;
pub use transfer::{TransferReceipt, TransferRequest};
