//! In-memory transaction log
//!
//! This module provides the `InMemoryTransactionLog` struct, an append-only
//! record of every balance change.
//!
//! # Design
//!
//! Records are grouped per account in a `DashMap<AccountId, Vec<Transaction>>`,
//! so a statement lookup only scans the history of one account. Identifiers come
//! from a single atomic counter shared by all accounts.
//!
//! Records are never updated or removed.

use super::traits::TransactionLog;
use crate::types::{AccountId, LedgerError, NewTransaction, Transaction};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe, append-only transaction log backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryTransactionLog {
    /// Per-account history in append order
    entries: DashMap<AccountId, Vec<Transaction>>,

    /// Next identifier to hand out
    next_id: AtomicU64,
}

impl InMemoryTransactionLog {
    /// Create an empty log whose first record gets id 1
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Total number of records across all accounts
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn append(&self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let transaction = entry.into_transaction(id);

        self.entries
            .entry(transaction.account)
            .or_default()
            .push(transaction.clone());

        Ok(transaction)
    }

    fn query(
        &self,
        account: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        if from > to {
            return Ok(Vec::new());
        }

        let mut matching: Vec<Transaction> = self
            .entries
            .get(&account)
            .map(|history| {
                history
                    .iter()
                    .filter(|tx| from <= tx.time && tx.time <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Wall clocks can step backwards; keep the statement in time order.
        matching.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));

        Ok(matching)
    }
}
