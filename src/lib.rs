//! Account Ledger Library
//! # Overview
//!
//! A concurrency-safe in-memory ledger. Accounts hold a decimal balance;
//! deposits, withdrawals and transfers may be issued from many threads at once
//! and every balance change is recorded in an append-only transaction log.
//!
//! # Architecture
//!
//! - [`types`] - Data model (Account, Transaction, LedgerCommand, LedgerError)
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Concurrent account storage
//!   - [`core::transaction_log`] - Append-only transaction history
//!   - [`core::locks`] - Per-account lock registry
//!   - [`core::ledger`] - Operations under the lock discipline
//!   - [`core::query`] - Read-only balance and statement lookups
//! - [`io`] - CSV command input and CSV output
//! - [`strategy`] - Sync and async replay of command files
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - Tracing subscriber setup
//!
//! # Guarantees
//!
//! - A balance never goes negative.
//! - Every successful deposit, withdrawal and transfer leg leaves exactly one
//!   transaction record; a failed operation leaves none.
//! - Transfers between the same two accounts in opposite directions never
//!   deadlock: locks are always taken in ascending account id order.

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{Ledger, LedgerQueries};
pub use io::{write_accounts_csv, write_transactions_csv};
pub use types::{
    Account, AccountId, LedgerCommand, LedgerError, Transaction, TransactionId, TransactionType,
};
