//! CSV format handling for ledger commands and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvCommand structure for deserialization
//! - Conversion from CSV records to `LedgerCommand`s
//! - Account and transaction output serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! type,account,to,amount,owner
//! create,,,,Alice
//! deposit,1,,100.00,
//! withdraw,1,,30,
//! transfer,1,2,50,
//! ```

use crate::types::{Account, AccountId, LedgerCommand, LedgerError, Transaction};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Every column except `type` is optional; which ones are required depends
/// on the command type.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvCommand {
    #[serde(rename = "type")]
    pub op: String,
    pub account: Option<AccountId>,
    pub to: Option<AccountId>,
    pub amount: Option<String>,
    pub owner: Option<String>,
}

/// Convert a CsvCommand to a LedgerCommand
///
/// This function:
/// - Parses the command type (case-insensitive)
/// - Parses the amount string into a Decimal (if present)
/// - Checks that the columns the command needs are present
///
/// Amount sign and scale are not checked here; the ledger rejects those.
pub fn convert_csv_command(record: CsvCommand) -> Result<LedgerCommand, String> {
    let op = record.op.trim().to_lowercase();

    let amount = match record.amount.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(
            Decimal::from_str(raw)
                .map_err(|_| format!("Invalid amount '{}' for {} command", raw, op))?,
        ),
        _ => None,
    };

    let require_account = |value: Option<AccountId>, column: &str| {
        value.ok_or_else(|| format!("{} command requires '{}'", op, column))
    };
    let require_amount =
        |value: Option<Decimal>| value.ok_or_else(|| format!("{} command requires an amount", op));

    match op.as_str() {
        "create" | "open" => {
            let owner = record
                .owner
                .as_deref()
                .map(str::trim)
                .filter(|owner| !owner.is_empty())
                .ok_or_else(|| format!("{} command requires an owner", op))?;
            Ok(LedgerCommand::CreateAccount {
                owner: owner.to_string(),
            })
        }
        "deposit" => Ok(LedgerCommand::Deposit {
            account: require_account(record.account, "account")?,
            amount: require_amount(amount)?,
        }),
        "withdraw" | "withdrawal" => Ok(LedgerCommand::Withdraw {
            account: require_account(record.account, "account")?,
            amount: require_amount(amount)?,
        }),
        "transfer" => Ok(LedgerCommand::Transfer {
            from: require_account(record.account, "account")?,
            to: require_account(record.to, "to")?,
            amount: require_amount(amount)?,
        }),
        _ => Err(format!("Invalid command type: '{}'", record.op)),
    }
}

/// Write account states to CSV format
///
/// Columns: id, owner, balance. Accounts are sorted by id and balances are
/// printed with two decimal places.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["id", "owner", "balance"])
        .map_err(write_error)?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.to_string(),
                account.owner,
                format!("{:.2}", account.balance),
            ])
            .map_err(write_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write transaction records to CSV format
///
/// Columns: id, account, type, amount, time. Records are written in the order
/// given; `time` is RFC 3339 UTC with microsecond precision.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["id", "account", "type", "amount", "time"])
        .map_err(write_error)?;

    for tx in transactions {
        writer
            .write_record(&[
                tx.id.to_string(),
                tx.account.to_string(),
                tx.tx_type.to_string(),
                format!("{:.2}", tx.amount),
                tx.time.to_rfc3339_opts(SecondsFormat::Micros, true),
            ])
            .map_err(write_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Output failures are I/O errors, not parse errors
fn write_error(error: csv::Error) -> LedgerError {
    LedgerError::Io {
        message: error.to_string(),
    }
}
