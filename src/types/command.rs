//! Ledger commands
//!
//! A `LedgerCommand` is one request against the ledger core, as read from a
//! command file by the replay strategies.

use super::account::AccountId;
use rust_decimal::Decimal;
use std::fmt;

/// A single request for the ledger core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    /// Open a new account with a zero balance
    CreateAccount { owner: String },

    /// Credit `amount` to `account`
    Deposit { account: AccountId, amount: Decimal },

    /// Debit `amount` from `account`
    Withdraw { account: AccountId, amount: Decimal },

    /// Move `amount` from `from` to `to`
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

impl LedgerCommand {
    /// Whether this command creates an account
    ///
    /// The async strategy treats account creation as an ordering barrier so
    /// that identifiers are assigned in file order.
    pub fn is_create(&self) -> bool {
        matches!(self, LedgerCommand::CreateAccount { .. })
    }
}

impl fmt::Display for LedgerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerCommand::CreateAccount { owner } => write!(f, "create account for '{}'", owner),
            LedgerCommand::Deposit { account, amount } => {
                write!(f, "deposit {} to account {}", amount, account)
            }
            LedgerCommand::Withdraw { account, amount } => {
                write!(f, "withdraw {} from account {}", amount, account)
            }
            LedgerCommand::Transfer { from, to, amount } => {
                write!(f, "transfer {} from account {} to account {}", amount, from, to)
            }
        }
    }
}
