//! Ledger core
//!
//! This module provides the `Ledger` struct, which applies every balance-affecting
//! operation to the shared account store and transaction log.
//!
//! # Concurrency discipline
//!
//! - Amounts are validated and accounts resolved before any lock is taken.
//! - `deposit`, `withdraw` and the readers hold the lock of one account.
//! - `transfer` holds the locks of both accounts, acquired in ascending id order.
//! - Inside the lock the account is re-read, the new balance computed, and the
//!   account save plus the transaction append committed as one unit of work.
//!
//! # Unit of work
//!
//! A commit saves every changed account, then appends all transaction records in
//! one batch. If any step fails, accounts already saved are restored from their
//! pre-images before the error is returned, still under the lock. Other callers
//! never observe a partially applied operation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error};

use super::account_store::InMemoryAccountStore;
use super::clock::SystemClock;
use super::locks::AccountLocks;
use super::traits::{AccountStore, Clock, TransactionLog};
use super::transaction_log::InMemoryTransactionLog;
use crate::types::{
    Account, AccountId, LedgerCommand, LedgerError, NewTransaction, Transaction,
};

/// Maximum number of fractional digits an amount may carry
pub const AMOUNT_SCALE: u32 = 2;

/// Concurrency-safe ledger over an account store and a transaction log
///
/// `Ledger` is `Send + Sync`; share it across threads or tasks with `Arc`.
#[derive(Debug)]
pub struct Ledger<A = InMemoryAccountStore, L = InMemoryTransactionLog> {
    accounts: A,
    transactions: L,
    locks: AccountLocks,
    clock: Arc<dyn Clock>,
}

/// Pre- and post-image of one account inside a commit
struct BalanceChange {
    before: Account,
    after: Account,
}

impl Ledger {
    /// Create an in-memory ledger using the system clock
    pub fn new() -> Self {
        Self::with_parts(
            InMemoryAccountStore::new(),
            InMemoryTransactionLog::new(),
            Arc::new(SystemClock),
        )
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AccountStore, L: TransactionLog> Ledger<A, L> {
    /// Create a ledger over the given collaborators
    pub fn with_parts(accounts: A, transactions: L, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            transactions,
            locks: AccountLocks::new(),
            clock,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn account_store(&self) -> &A {
        &self.accounts
    }

    pub fn transaction_log(&self) -> &L {
        &self.transactions
    }

    /// Open a new account with a zero balance
    ///
    /// No lock is needed: no existing account is touched.
    pub fn create_account(&self, owner: &str) -> Result<Account, LedgerError> {
        let account = self.accounts.create(owner)?;
        debug!(account = account.id, owner = %account.owner, "account created");
        Ok(account)
    }

    /// Credit `amount` to account `id`
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the amount is not positive or has too many decimals
    /// - `AccountNotFound` if the account does not exist
    /// - `ArithmeticOverflow` if the balance would leave the decimal range
    /// - `Storage` if the commit fails; the balance is left unchanged
    pub fn deposit(&self, id: AccountId, amount: Decimal) -> Result<Account, LedgerError> {
        validate_amount(amount)?;
        self.accounts.get(id)?;

        self.locks.with_account(id, || {
            let before = self.accounts.get(id)?;
            let balance = before
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", id))?;
            let after = before.with_balance(balance);

            let entry = NewTransaction::deposit(id, amount, self.clock.now());
            self.commit(
                &[BalanceChange {
                    before,
                    after: after.clone(),
                }],
                vec![entry],
            )?;

            debug!(account = id, %amount, balance = %after.balance, "deposit applied");
            Ok(after)
        })
    }

    /// Debit `amount` from account `id`
    ///
    /// The balance check and the debit happen under the same lock.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the amount is not positive or has too many decimals
    /// - `AccountNotFound` if the account does not exist
    /// - `InsufficientFunds` if the balance is lower than `amount`
    /// - `Storage` if the commit fails; the balance is left unchanged
    pub fn withdraw(&self, id: AccountId, amount: Decimal) -> Result<Account, LedgerError> {
        validate_amount(amount)?;
        self.accounts.get(id)?;

        self.locks.with_account(id, || {
            let before = self.accounts.get(id)?;
            if before.balance < amount {
                return Err(LedgerError::insufficient_funds(id, before.balance, amount));
            }
            let balance = before
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("withdraw", id))?;
            let after = before.with_balance(balance);

            let entry = NewTransaction::withdraw(id, amount, self.clock.now());
            self.commit(
                &[BalanceChange {
                    before,
                    after: after.clone(),
                }],
                vec![entry],
            )?;

            debug!(account = id, %amount, balance = %after.balance, "withdrawal applied");
            Ok(after)
        })
    }

    /// Move `amount` from `from` to `to` and return the debited source account
    ///
    /// Both legs commit inside one lock window covering both accounts. The
    /// log receives a WITHDRAW on `from` followed by a DEPOSIT on `to`.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` for a bad amount or when `from == to`
    /// - `AccountNotFound` if either account does not exist
    /// - `InsufficientFunds` (for `from`) if the source balance is too low
    /// - `ArithmeticOverflow` if the destination balance would overflow
    /// - `Storage` if the commit fails; neither balance changes
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    ) -> Result<Account, LedgerError> {
        validate_amount(amount)?;
        if from == to {
            return Err(LedgerError::invalid_operation(format!(
                "cannot transfer from account {} to itself",
                from
            )));
        }
        self.accounts.get(from)?;
        self.accounts.get(to)?;

        self.locks.with_pair(from, to, || {
            let source = self.accounts.get(from)?;
            let destination = self.accounts.get(to)?;

            if source.balance < amount {
                return Err(LedgerError::insufficient_funds(from, source.balance, amount));
            }
            let source_balance = source
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", from))?;
            let destination_balance = destination
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::arithmetic_overflow("transfer", to))?;

            let debited = source.with_balance(source_balance);
            let credited = destination.with_balance(destination_balance);

            let entries = vec![
                NewTransaction::withdraw(from, amount, self.clock.now()),
                NewTransaction::deposit(to, amount, self.clock.now()),
            ];
            self.commit(
                &[
                    BalanceChange {
                        before: source,
                        after: debited.clone(),
                    },
                    BalanceChange {
                        before: destination,
                        after: credited,
                    },
                ],
                entries,
            )?;

            debug!(from, to, %amount, "transfer applied");
            Ok(debited)
        })?
    }

    /// Current balance of account `id`, read under the account lock
    pub fn get_balance(&self, id: AccountId) -> Result<Decimal, LedgerError> {
        self.get_account(id).map(|account| account.balance)
    }

    /// Current state of account `id`, read under the account lock
    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.accounts.get(id)?;
        self.locks.with_account(id, || self.accounts.get(id))
    }

    /// Transactions of account `id` with `from <= time <= to`, oldest first
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if the account does not exist, even though the log
    /// itself would just return nothing.
    pub fn get_transactions(
        &self,
        id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.accounts.get(id)?;
        self.locks
            .with_account(id, || self.transactions.query(id, from, to))
    }

    /// Snapshot of every account ordered by id
    ///
    /// The locks of all known accounts are held together while the records
    /// are re-read, so no transfer is ever seen with only one leg applied.
    /// Accounts created after the id list is taken are not included.
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let ids = self.account_ids()?;
        self.locks.with_all(&ids, || {
            ids.iter().map(|id| self.accounts.get(*id)).collect()
        })
    }

    /// Every recorded transaction, grouped by account in id order
    ///
    /// Taken in one window holding the locks of all known accounts, so both
    /// records of a transfer are present or neither is.
    pub fn all_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        let ids = self.account_ids()?;
        self.locks.with_all(&ids, || {
            let mut transactions = Vec::new();
            for id in &ids {
                transactions.extend(self.transactions.query(
                    *id,
                    DateTime::<Utc>::MIN_UTC,
                    DateTime::<Utc>::MAX_UTC,
                )?);
            }
            Ok(transactions)
        })
    }

    fn account_ids(&self) -> Result<Vec<AccountId>, LedgerError> {
        Ok(self.accounts.all()?.into_iter().map(|account| account.id).collect())
    }

    /// Apply a parsed command
    ///
    /// Returns the account the command produced: the new account for
    /// `CreateAccount`, the debited source for `Transfer`.
    pub fn execute(&self, command: LedgerCommand) -> Result<Account, LedgerError> {
        match command {
            LedgerCommand::CreateAccount { owner } => self.create_account(&owner),
            LedgerCommand::Deposit { account, amount } => self.deposit(account, amount),
            LedgerCommand::Withdraw { account, amount } => self.withdraw(account, amount),
            LedgerCommand::Transfer { from, to, amount } => self.transfer(from, to, amount),
        }
    }

    /// Save all post-images, then append all records; undo saves on failure
    ///
    /// Must be called with the locks of every changed account held.
    fn commit(
        &self,
        changes: &[BalanceChange],
        entries: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        for (index, change) in changes.iter().enumerate() {
            if let Err(error) = self.accounts.save(change.after.clone()) {
                self.restore(&changes[..index]);
                return Err(error);
            }
        }

        match self.transactions.append_all(entries) {
            Ok(recorded) => Ok(recorded),
            Err(error) => {
                self.restore(changes);
                Err(error)
            }
        }
    }

    fn restore(&self, changes: &[BalanceChange]) {
        for change in changes.iter().rev() {
            if let Err(restore_error) = self.accounts.save(change.before.clone()) {
                error!(
                    account = change.before.id,
                    error = %restore_error,
                    "failed to restore account after aborted commit"
                );
            }
        }
    }
}

/// Check that `amount` is strictly positive with at most `AMOUNT_SCALE` decimals
fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_operation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(LedgerError::invalid_operation(format!(
            "amount {} has more than {} decimal places",
            amount, AMOUNT_SCALE
        )));
    }
    Ok(())
}
