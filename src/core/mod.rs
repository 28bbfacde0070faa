//! Core business logic module
//!
//! This module contains the ledger core and its collaborators:
//! - `traits` - Seams for account storage, the transaction log and the clock
//! - `account_store` - Concurrent in-memory account storage
//! - `transaction_log` - Concurrent in-memory append-only transaction log
//! - `locks` - Per-account lock registry with ordered two-account sections
//! - `clock` - System and manual clocks
//! - `ledger` - Deposit, withdraw and transfer under the lock discipline
//! - `query` - Read-only balance and statement facade

pub mod account_store;
pub mod clock;
pub mod ledger;
pub mod locks;
pub mod query;
pub mod traits;
pub mod transaction_log;

pub use account_store::InMemoryAccountStore;
pub use clock::{ManualClock, SystemClock};
pub use ledger::{Ledger, AMOUNT_SCALE};
pub use locks::AccountLocks;
pub use query::LedgerQueries;
pub use traits::{AccountStore, Clock, TransactionLog};
pub use transaction_log::InMemoryTransactionLog;
