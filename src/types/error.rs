//! Error types for the Rust Transfer Engine
//!
//! This module defines all error types that can occur while executing a
//! transfer or while reading and writing the CSV files around it.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Self-transfer, non-positive amount. Rejected before
//!   any lock is taken.
//! - **Business Errors**: Insufficient funds, unknown account, overflow.
//!   Rejected inside the critical section, before any write.
//! - **Lock Errors**: Bounded lock wait exceeded.
//! - **File I/O and CSV Errors**: File not found, malformed CSV, etc.

use crate::types::{AccountId, Balance};
use thiserror::Error;

/// Main error type for the transfer engine
///
/// Every variant is a terminal outcome of a transfer: the engine never
/// retries, and any lock taken before the error was raised has already been
/// released when the caller sees it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// The request can never succeed as stated
    ///
    /// Raised for self-transfers and non-positive amounts, before any lock is
    /// acquired or any balance read.
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Why the request was rejected
        reason: String,
    },

    /// Sender balance is below the requested amount
    ///
    /// Observed while both locks are held. Neither account is written.
    #[error("Insufficient funds for account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender account
        account: AccountId,
        /// Sender balance at the time of the check
        available: Balance,
        /// Requested transfer amount
        requested: Balance,
    },

    /// The store has no account with this identifier
    #[error("Unknown account: {account}")]
    UnknownAccount {
        /// The identifier that was looked up
        account: AccountId,
    },

    /// Crediting the receiver would overflow its balance
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        account: AccountId,
    },

    /// A lock could not be acquired within the configured bound
    #[error("Timed out after {waited_ms}ms waiting for the lock on account {account}")]
    LockTimeout {
        /// Account whose lock was contended
        account: AccountId,
        /// Configured wait bound in milliseconds
        waited_ms: u64,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

// Conversion from io::Error to TransferError
impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        TransferError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to TransferError
impl From<csv::Error> for TransferError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        TransferError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl TransferError {
    /// Create an InvalidOperation error for a transfer whose sender is also its receiver
    pub fn self_transfer(account: &str) -> Self {
        TransferError::InvalidOperation {
            reason: format!("account {} cannot transfer to itself", account),
        }
    }

    /// Create an InvalidOperation error for a zero or negative amount
    pub fn non_positive_amount(amount: Balance) -> Self {
        TransferError::InvalidOperation {
            reason: format!("amount must be positive, got {}", amount),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, available: Balance, requested: Balance) -> Self {
        TransferError::InsufficientFunds {
            account: account.to_string(),
            available,
            requested,
        }
    }

    /// Create an UnknownAccount error
    pub fn unknown_account(account: &str) -> Self {
        TransferError::UnknownAccount {
            account: account.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        TransferError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(account: &str, waited_ms: u64) -> Self {
        TransferError::LockTimeout {
            account: account.to_string(),
            waited_ms,
        }
    }

    /// Whether the request was rejected before any lock was taken
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, TransferError::InvalidOperation { .. })
    }
}
