//! CSV format handling for account seeds, transfer requests and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Record structures for deserialization
//! - Conversion from transfer CSV records to domain types
//! - Loading of opening balances
//! - Balance output serialization
//!
//! # Formats
//!
//! ```text
//! accounts.csv         transfers.csv              output
//! account,balance      sender,receiver,amount     account,balance
//! samsung,1000         samsung,lotte,10           lotte,1010
//! lotte,1000                                      samsung,990
//! ```

use crate::types::{Account, AccountId, Balance, TransferError, TransferRequest};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// One row of the accounts file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub account: AccountId,
    pub balance: Balance,
}

/// One row of the transfers file
///
/// The amount is kept as a string so that a malformed value yields a message
/// naming the offending row instead of a bare deserializer error.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub sender: String,
    pub receiver: String,
    pub amount: Option<String>,
}

/// Convert a TransferCsvRecord to a TransferRequest
///
/// Non-positive amounts and self-transfers are passed through unchanged; they
/// are business rejections reported by the coordinator, not format errors.
///
/// # Returns
///
/// * `Ok(TransferRequest)` - Successfully converted record
/// * `Err(String)` - Missing account id, or missing or non-integer amount
pub fn convert_transfer_record(record: TransferCsvRecord) -> Result<TransferRequest, String> {
    let sender = record.sender.trim();
    let receiver = record.receiver.trim();

    if sender.is_empty() || receiver.is_empty() {
        return Err(format!(
            "Transfer '{}' -> '{}' requires both a sender and a receiver",
            sender, receiver
        ));
    }

    let amount = match record.amount.as_deref().map(str::trim) {
        Some(amount_str) if !amount_str.is_empty() => {
            amount_str.parse::<Balance>().map_err(|_| {
                format!(
                    "Invalid amount '{}' for transfer {} -> {}",
                    amount_str, sender, receiver
                )
            })?
        }
        _ => {
            return Err(format!(
                "Transfer {} -> {} requires an amount",
                sender, receiver
            ))
        }
    };

    Ok(TransferRequest::new(sender, receiver, amount))
}

/// Read opening balances from an accounts CSV file
///
/// Unlike transfer rows, a malformed account row is fatal: the engine cannot
/// decide what a missing balance should be.
///
/// # Errors
///
/// * `TransferError::FileNotFound` if the path does not exist
/// * `TransferError::IoError` if the file cannot be opened
/// * `TransferError::ParseError` for the first malformed row
/// * `TransferError::InvalidOperation` for a negative opening balance or an
///   account id listed more than once
pub fn read_accounts(path: &Path) -> Result<Vec<(AccountId, Balance)>, TransferError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TransferError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => TransferError::from(e),
    })?;

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut accounts = Vec::new();
    let mut seen = HashSet::new();
    for result in reader.deserialize::<AccountCsvRecord>() {
        let record = result?;
        if !seen.insert(record.account.clone()) {
            return Err(TransferError::InvalidOperation {
                reason: format!("account {} is listed more than once", record.account),
            });
        }
        if record.balance < 0 {
            return Err(TransferError::InvalidOperation {
                reason: format!(
                    "account {} has negative opening balance {}",
                    record.account, record.balance
                ),
            });
        }
        accounts.push((record.account, record.balance));
    }

    Ok(accounts)
}

/// Write account balances to CSV format
///
/// Writes accounts with columns: account, balance.
/// Accounts are sorted by id for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances_csv(
    accounts: &[(AccountId, Account)],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts: Vec<&(AccountId, Account)> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.0.cmp(&b.0));

    for (id, account) in sorted_accounts {
        writer
            .write_record([id.as_str(), account.balance.to_string().as_str()])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn record(sender: &str, receiver: &str, amount: Option<&str>) -> TransferCsvRecord {
        TransferCsvRecord {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount: amount.map(|s| s.to_string()),
        }
    }

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::positive("10", 10)]
    #[case::padded("  25 ", 25)]
    #[case::zero("0", 0)]
    #[case::negative("-5", -5)]
    fn test_convert_transfer_record_amounts(#[case] amount: &str, #[case] expected: Balance) {
        let request = convert_transfer_record(record("samsung", "lotte", Some(amount))).unwrap();

        assert_eq!(request, TransferRequest::new("samsung", "lotte", expected));
    }

    #[test]
    fn test_convert_transfer_record_keeps_self_transfer() {
        let request = convert_transfer_record(record("samsung", "samsung", Some("100"))).unwrap();

        assert_eq!(request.sender, request.receiver);
    }

    #[rstest]
    #[case::missing_amount(record("samsung", "lotte", None), "requires an amount")]
    #[case::blank_amount(record("samsung", "lotte", Some("  ")), "requires an amount")]
    #[case::decimal_amount(record("samsung", "lotte", Some("10.5")), "Invalid amount '10.5'")]
    #[case::text_amount(record("samsung", "lotte", Some("ten")), "Invalid amount 'ten'")]
    #[case::missing_sender(record("", "lotte", Some("10")), "requires both")]
    #[case::missing_receiver(record("samsung", " ", Some("10")), "requires both")]
    fn test_convert_transfer_record_errors(
        #[case] input: TransferCsvRecord,
        #[case] expected_fragment: &str,
    ) {
        let error = convert_transfer_record(input).unwrap_err();

        assert!(
            error.contains(expected_fragment),
            "'{}' does not mention '{}'",
            error,
            expected_fragment
        );
    }

    #[test]
    fn test_read_accounts() {
        let file = create_temp_csv("account,balance\nsamsung,1000\n  lotte , 500 \n");

        let accounts = read_accounts(file.path()).unwrap();

        assert_eq!(
            accounts,
            vec![("samsung".to_string(), 1000), ("lotte".to_string(), 500)]
        );
    }

    #[test]
    fn test_read_accounts_missing_file() {
        let result = read_accounts(Path::new("nonexistent_accounts.csv"));

        assert_eq!(
            result,
            Err(TransferError::FileNotFound {
                path: "nonexistent_accounts.csv".to_string()
            })
        );
    }

    #[test]
    fn test_read_accounts_malformed_balance() {
        let file = create_temp_csv("account,balance\nsamsung,lots\n");

        let result = read_accounts(file.path());

        assert!(matches!(result, Err(TransferError::ParseError { .. })));
    }

    #[test]
    fn test_read_accounts_negative_balance() {
        let file = create_temp_csv("account,balance\nsamsung,-1\n");

        let result = read_accounts(file.path());

        assert!(result.unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_read_accounts_duplicate_id() {
        let file = create_temp_csv("account,balance\nsamsung,1000\nlotte,0\nsamsung,5\n");

        let result = read_accounts(file.path());

        assert_eq!(
            result,
            Err(TransferError::InvalidOperation {
                reason: "account samsung is listed more than once".to_string()
            })
        );
    }

    #[test]
    fn test_write_balances_csv_sorted() {
        let accounts = vec![
            ("samsung".to_string(), Account::of(990)),
            ("lotte".to_string(), Account::of(1010)),
        ];
        let mut output = Vec::new();

        write_balances_csv(&accounts, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "account,balance\nlotte,1010\nsamsung,990\n"
        );
    }

    #[test]
    fn test_write_balances_csv_empty() {
        let mut output = Vec::new();

        write_balances_csv(&[], &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "account,balance\n");
    }
}
