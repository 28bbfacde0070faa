//! Read-only query facade
//!
//! `LedgerQueries` exposes balance and statement lookups without giving the
//! caller access to any mutating operation. Every call goes through the ledger,
//! so reads take the same per-account lock as writes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::account_store::InMemoryAccountStore;
use super::ledger::Ledger;
use super::traits::{AccountStore, TransactionLog};
use super::transaction_log::InMemoryTransactionLog;
use crate::types::{Account, AccountId, LedgerError, Transaction};

/// Read-only view over a shared ledger
#[derive(Debug)]
pub struct LedgerQueries<A = InMemoryAccountStore, L = InMemoryTransactionLog> {
    ledger: Arc<Ledger<A, L>>,
}

impl<A, L> Clone for LedgerQueries<A, L> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<A: AccountStore, L: TransactionLog> LedgerQueries<A, L> {
    pub fn new(ledger: Arc<Ledger<A, L>>) -> Self {
        Self { ledger }
    }

    /// Current balance of `id`
    pub fn balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        self.ledger.get_balance(id)
    }

    /// Current state of `id`
    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.ledger.get_account(id)
    }

    /// Transactions of `id` between `from` and `to`, both inclusive
    pub fn statement(
        &self,
        id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.ledger.get_transactions(id, from, to)
    }

    /// Every transaction ever recorded for `id`
    pub fn full_statement(&self, id: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        self.statement(id, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
    }

    /// Consistent snapshot of all accounts ordered by id
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        self.ledger.accounts()
    }

    /// Full transaction history, grouped by account in id order
    pub fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        self.ledger.all_transactions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use rust_decimal::Decimal;

    fn setup() -> (Arc<Ledger>, LedgerQueries) {
        let ledger = Arc::new(Ledger::new());
        let queries = LedgerQueries::new(Arc::clone(&ledger));
        (ledger, queries)
    }

    #[test]
    fn test_balance_and_account_follow_ledger() {
        let (ledger, queries) = setup();
        let account = ledger.create_account("Alice").unwrap();
        ledger.deposit(account.id, Decimal::new(1999, 2)).unwrap();

        assert_eq!(queries.balance(account.id).unwrap(), Decimal::new(1999, 2));
        assert_eq!(queries.account(account.id).unwrap().owner, "Alice");
    }

    #[test]
    fn test_unknown_account_errors() {
        let (_ledger, queries) = setup();

        assert_eq!(
            queries.balance(4).unwrap_err(),
            LedgerError::account_not_found(4)
        );
        assert_eq!(
            queries.full_statement(4).unwrap_err(),
            LedgerError::account_not_found(4)
        );
    }

    #[test]
    fn test_all_transactions_grouped_by_account() {
        let (ledger, queries) = setup();
        let alice = ledger.create_account("Alice").unwrap();
        let bob = ledger.create_account("Bob").unwrap();
        ledger.deposit(bob.id, Decimal::TEN).unwrap();
        ledger.deposit(alice.id, Decimal::TEN).unwrap();
        ledger.transfer(alice.id, bob.id, Decimal::ONE).unwrap();

        let all = queries.all_transactions().unwrap();

        let summary: Vec<(AccountId, TransactionType)> =
            all.iter().map(|tx| (tx.account, tx.tx_type)).collect();
        assert_eq!(
            summary,
            vec![
                (alice.id, TransactionType::Deposit),
                (alice.id, TransactionType::Withdraw),
                (bob.id, TransactionType::Deposit),
                (bob.id, TransactionType::Deposit),
            ]
        );
    }

    #[test]
    fn test_queries_clone_share_ledger() {
        let (ledger, queries) = setup();
        let copy = queries.clone();
        let account = ledger.create_account("Alice").unwrap();

        assert_eq!(copy.balance(account.id).unwrap(), Decimal::ZERO);
        assert_eq!(queries.accounts().unwrap().len(), 1);
    }
}
