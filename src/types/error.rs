//! Error types for the account ledger
//!
//! This module defines all error types that can occur while operating the ledger.
//!
//! # Error Categories
//!
//! - **Request Errors**: Unknown account, insufficient funds, invalid operation,
//!   arithmetic overflow. These are reported to the caller and never leave shared
//!   state partially mutated.
//! - **Infrastructure Errors**: Storage failures and file I/O. These are distinct
//!   from request errors so callers can decide whether a retry makes sense.
//! - **Input Errors**: Malformed command CSV rows read by the replay front end.

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Each variant carries enough context (usually the offending account id)
/// for the caller to act on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The referenced account does not exist
    #[error("Account {account} not found")]
    AccountNotFound {
        /// The account that could not be resolved
        account: AccountId,
    },

    /// The account balance does not cover the requested debit
    ///
    /// Checked under the account lock, so the reported balance is the one
    /// the ledger actually compared against.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the instant of the check
        balance: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// The request is malformed (self-transfer, non-positive amount, ...)
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Human readable reason
        reason: String,
    },

    /// Applying the operation would overflow the decimal range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being credited
        account: AccountId,
    },

    /// The account store or transaction log failed
    #[error("Storage failure: {message}")]
    Storage {
        /// Description of the failure
        message: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// A command row could not be parsed
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        LedgerError::AccountNotFound { account }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        LedgerError::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }

    /// Whether this failure comes from the infrastructure rather than the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, LedgerError::Storage { .. } | LedgerError::Io { .. })
    }
}
