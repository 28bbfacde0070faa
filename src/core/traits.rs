//! Core traits for account storage, the transaction log and time
//!
//! These are the seams between the ledger core and its collaborators. The
//! ledger owns all locking; implementations only have to keep each single call
//! internally consistent.

use crate::types::{Account, AccountId, LedgerError, NewTransaction, Transaction};
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Storage for account records
///
/// All updates are full-record replacements: callers read the account,
/// build a new value and save it back. The store provides no cross-call
/// locking; serializing access per account is the ledger's job.
pub trait AccountStore: Send + Sync {
    /// Get an account by id
    fn get(&self, id: AccountId) -> Result<Account, LedgerError>;

    /// Create an account with a zero balance and the next free id
    fn create(&self, owner: &str) -> Result<Account, LedgerError>;

    /// Replace the stored record for `account.id`
    ///
    /// Fails with `AccountNotFound` if no such account was ever created.
    fn save(&self, account: Account) -> Result<Account, LedgerError>;

    /// All accounts ordered by id
    fn all(&self) -> Result<Vec<Account>, LedgerError>;
}

/// Append-only storage for transaction records
pub trait TransactionLog: Send + Sync {
    /// Append a single record and return it with its assigned id
    fn append(&self, entry: NewTransaction) -> Result<Transaction, LedgerError>;

    /// Append several records as one batch
    ///
    /// The default appends one by one. Backends that can fail part way
    /// through should override this to commit all records or none.
    fn append_all(&self, entries: Vec<NewTransaction>) -> Result<Vec<Transaction>, LedgerError> {
        entries.into_iter().map(|entry| self.append(entry)).collect()
    }

    /// Records of `account` with `from <= time <= to`, oldest first
    fn query(
        &self,
        account: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError>;
}

/// Source of transaction timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}
