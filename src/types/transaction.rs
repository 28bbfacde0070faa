//! Transaction-related types for the account ledger
//!
//! This module defines the records kept in the append-only transaction log.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Assigned sequentially by the transaction log, starting at 1.
pub type TransactionId = u64;

/// Kind of balance change recorded in the log
///
/// A transfer is not a kind of its own: it produces one `Withdraw` on the
/// source account and one `Deposit` on the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Funds credited to the account
    Deposit,

    /// Funds debited from the account
    Withdraw,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Deposit => f.write_str("DEPOSIT"),
            TransactionType::Withdraw => f.write_str("WITHDRAW"),
        }
    }
}

/// A committed, immutable transaction record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,

    /// The account this record belongs to (reference by id)
    pub account: AccountId,

    /// Direction of the balance change
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Amount moved, always strictly positive
    pub amount: Decimal,

    /// When the ledger applied the change
    pub time: DateTime<Utc>,
}

/// A transaction that has not been appended to the log yet
///
/// The log assigns the identifier when the record is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub account: AccountId,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub time: DateTime<Utc>,
}

impl NewTransaction {
    /// A deposit record for `account`
    pub fn deposit(account: AccountId, amount: Decimal, time: DateTime<Utc>) -> Self {
        NewTransaction {
            account,
            tx_type: TransactionType::Deposit,
            amount,
            time,
        }
    }

    /// A withdrawal record for `account`
    pub fn withdraw(account: AccountId, amount: Decimal, time: DateTime<Utc>) -> Self {
        NewTransaction {
            account,
            tx_type: TransactionType::Withdraw,
            amount,
            time,
        }
    }

    /// Turn this entry into a committed record with the given id
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            account: self.account,
            tx_type: self.tx_type,
            amount: self.amount,
            time: self.time,
        }
    }
}
