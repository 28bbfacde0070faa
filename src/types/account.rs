//! Account-related types for the account ledger
//!
//! This module defines the Account record held by the account store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Assigned sequentially by the account store, starting at 1.
pub type AccountId = u64;

/// A monetary account
///
/// Accounts are plain value records. The ledger reads them from the store,
/// computes a replacement and saves the whole record back while holding the
/// account's lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier
    pub id: AccountId,

    /// Name of the account holder
    pub owner: String,

    /// Current balance
    ///
    /// Never negative between ledger operations.
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier assigned by the store
    /// * `owner` - The account holder
    pub fn new(id: AccountId, owner: impl Into<String>) -> Self {
        Account {
            id,
            owner: owner.into(),
            balance: Decimal::ZERO,
        }
    }

    /// Copy of this account with a different balance
    pub fn with_balance(&self, balance: Decimal) -> Self {
        Account {
            balance,
            ..self.clone()
        }
    }
}
