//! In-memory account storage
//!
//! This module provides the `InMemoryAccountStore` struct, which keeps account
//! records in a concurrent map.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) so that lookups and saves for
//! different accounts never contend on a global lock. Identifiers come from an
//! atomic counter, so concurrent `create` calls always receive distinct ids.
//!
//! # Thread Safety
//!
//! Every single call is atomic with respect to the record it touches. The store
//! does *not* serialize read-modify-write sequences across calls; the ledger core
//! does that with its per-account locks.

use super::traits::AccountStore;
use crate::types::{Account, AccountId, LedgerError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe account store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryAccountStore {
    /// Account records keyed by id
    accounts: DashMap<AccountId, Account>,

    /// Next identifier to hand out
    next_id: AtomicU64,
}

impl InMemoryAccountStore {
    /// Create an empty store whose first account gets id 1
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    fn create(&self, owner: &str) -> Result<Account, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let account = Account::new(id, owner);
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    fn save(&self, account: Account) -> Result<Account, LedgerError> {
        match self.accounts.get_mut(&account.id) {
            Some(mut entry) => {
                *entry.value_mut() = account.clone();
                Ok(account)
            }
            None => Err(LedgerError::account_not_found(account.id)),
        }
    }

    fn all(&self) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_creates_empty_store() {
        let store = InMemoryAccountStore::new();
        assert!(store.is_empty());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_create_assigns_sequential_ids_from_one() {
        let store = InMemoryAccountStore::new();

        let alice = store.create("Alice").unwrap();
        let bob = store.create("Bob").unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(alice.balance, Decimal::ZERO);
        assert_eq!(bob.owner, "Bob");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_returns_stored_account() {
        let store = InMemoryAccountStore::new();
        let created = store.create("Alice").unwrap();

        let fetched = store.get(created.id).unwrap();

        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_unknown_account() {
        let store = InMemoryAccountStore::new();

        let result = store.get(99);

        assert_eq!(result.unwrap_err(), LedgerError::account_not_found(99));
    }

    #[test]
    fn test_save_replaces_whole_record() {
        let store = InMemoryAccountStore::new();
        let created = store.create("Alice").unwrap();

        let updated = created.with_balance(Decimal::new(4200, 2));
        store.save(updated.clone()).unwrap();

        assert_eq!(store.get(created.id).unwrap(), updated);
    }

    #[test]
    fn test_save_unknown_account_is_rejected() {
        let store = InMemoryAccountStore::new();

        let result = store.save(Account::new(5, "Ghost"));

        assert_eq!(result.unwrap_err(), LedgerError::account_not_found(5));
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_is_sorted_by_id() {
        let store = InMemoryAccountStore::new();
        for owner in ["A", "B", "C", "D"] {
            store.create(owner).unwrap();
        }

        let ids: Vec<AccountId> = store.all().unwrap().iter().map(|a| a.id).collect();

        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_concurrent_create_assigns_unique_ids() {
        let store = Arc::new(InMemoryAccountStore::new());
        let mut handles = vec![];

        for i in 0..16 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                (0..25)
                    .map(|j| store_clone.create(&format!("owner-{}-{}", i, j)).unwrap().id)
                    .collect::<Vec<_>>()
            });
            handles.push(handle);
        }

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id), "duplicate id {}", id);
            }
        }

        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }
}
