//! Per-account lock registry
//!
//! The registry maps an account id to its own mutex. Ownership of an account is
//! acquired by id, never through a loaded account value. Entries are created on
//! first use and never removed, so two callers asking for the same id always get
//! the same mutex.
//!
//! # Deadlock freedom
//!
//! Two-account sections always lock the lower id first. Any two callers that need
//! the same pair therefore queue on the same first mutex and cannot form a cycle.
//! Asking for the same id twice is rejected before any lock is taken.
//! Snapshot sections over many accounts follow the same ascending order, so
//! they cannot form a cycle with pair sections either.
//!
//! Locks are held by RAII guards scoped to the closure, so they are released on
//! every exit path, including early returns through `?`.

use crate::types::{AccountId, LedgerError};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry of per-account mutexes
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Mutex handle for `id`, created on first use
    ///
    /// The handle is cloned out of the map so no shard guard is held while the
    /// caller blocks on the account mutex.
    fn handle(&self, id: AccountId) -> Arc<Mutex<()>> {
        let entry = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Run `f` while holding exclusive ownership of `id`
    pub fn with_account<T>(&self, id: AccountId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(id);
        let _guard = handle.lock();
        f()
    }

    /// Run `f` while holding exclusive ownership of both `a` and `b`
    ///
    /// Locks are taken in ascending id order regardless of argument order.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `a == b`; taking the same mutex twice would
    /// deadlock the caller.
    pub fn with_pair<T>(
        &self,
        a: AccountId,
        b: AccountId,
        f: impl FnOnce() -> T,
    ) -> Result<T, LedgerError> {
        if a == b {
            return Err(LedgerError::invalid_operation(format!(
                "cannot lock account {} twice",
                a
            )));
        }

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let first = self.handle(low);
        let second = self.handle(high);

        let _first = first.lock();
        let _second = second.lock();
        Ok(f())
    }

    /// Run `f` while holding exclusive ownership of every id in `ids`
    ///
    /// Duplicates are ignored. Locks are taken in ascending id order and all
    /// guards are held until `f` returns.
    pub fn with_all<T>(&self, ids: &[AccountId], f: impl FnOnce() -> T) -> T {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let handles: Vec<_> = ordered.into_iter().map(|id| self.handle(id)).collect();
        let _guards: Vec<_> = handles.iter().map(|handle| handle.lock()).collect();
        f()
    }

    /// Number of accounts that have a mutex
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
