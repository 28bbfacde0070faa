//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account records and identifiers
//! - `transaction`: Transaction log records and identifiers
//! - `command`: Requests accepted by the ledger core
//! - `error`: Error types for the ledger

pub mod account;
pub mod command;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountId};
pub use command::LedgerCommand;
pub use error::LedgerError;
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionType};
