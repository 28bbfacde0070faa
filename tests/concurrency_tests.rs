//! Multi-threaded tests of the ledger's race-freedom guarantees
//!
//! Every test hammers a shared `Arc<Ledger>` from plain OS threads and then
//! checks an invariant that would break under a lost update, a torn read or a
//! deadlock.

use account_ledger::core::{
    AccountStore, InMemoryAccountStore, InMemoryTransactionLog, LedgerQueries, SystemClock,
    TransactionLog,
};
use account_ledger::types::{Account, AccountId, NewTransaction, Transaction};
use account_ledger::{Ledger, LedgerError, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;

#[test]
fn test_concurrent_deposits_lose_no_updates() {
    let ledger = Arc::new(Ledger::new());
    let account = ledger.create_account("Alice").unwrap();
    let per_thread = 250;
    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = vec![];

    for _ in 0..THREADS {
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..per_thread {
                ledger.deposit(account.id, Decimal::new(1, 2)).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = Decimal::new((THREADS * per_thread) as i64, 2);
    assert_eq!(ledger.get_balance(account.id).unwrap(), expected);

    let history = LedgerQueries::new(Arc::clone(&ledger))
        .full_statement(account.id)
        .unwrap();
    assert_eq!(history.len(), THREADS * per_thread);
    assert!(history
        .iter()
        .all(|tx| tx.tx_type == TransactionType::Deposit && tx.amount == Decimal::new(1, 2)));
}

#[test]
fn test_opposing_transfers_do_not_deadlock() {
    let ledger = Arc::new(Ledger::new());
    let a = ledger.create_account("A").unwrap().id;
    let b = ledger.create_account("B").unwrap().id;
    ledger.deposit(a, Decimal::new(1000, 0)).unwrap();
    ledger.deposit(b, Decimal::new(1000, 0)).unwrap();

    let rounds = 500;
    let (done_tx, done_rx) = mpsc::channel();
    for i in 0..THREADS {
        let ledger = Arc::clone(&ledger);
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
            for _ in 0..rounds {
                ledger.transfer(from, to, Decimal::ONE).unwrap();
            }
            done_tx.send(()).unwrap();
        });
    }

    for _ in 0..THREADS {
        done_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("opposing transfers deadlocked");
    }

    // Equal numbers of transfers each way net out.
    assert_eq!(ledger.get_balance(a).unwrap(), Decimal::new(1000, 0));
    assert_eq!(ledger.get_balance(b).unwrap(), Decimal::new(1000, 0));

    // Two seed deposits plus one record per leg.
    let records = 2 + THREADS * rounds * 2;
    assert_eq!(ledger.transaction_log().len(), records);
}

#[test]
fn test_contended_withdrawals_never_overdraw() {
    let ledger = Arc::new(Ledger::new());
    let account = ledger.create_account("Alice").unwrap().id;
    ledger.deposit(account, Decimal::new(100, 0)).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let mut handles = vec![];
    for _ in 0..THREADS {
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut succeeded = 0;
            for _ in 0..50 {
                match ledger.withdraw(account, Decimal::ONE) {
                    Ok(after) => {
                        assert!(after.balance >= Decimal::ZERO);
                        succeeded += 1;
                    }
                    Err(LedgerError::InsufficientFunds { balance, .. }) => {
                        assert!(balance < Decimal::ONE);
                    }
                    Err(other) => panic!("unexpected error: {}", other),
                }
            }
            succeeded
        }));
    }

    let succeeded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(succeeded, 100);
    assert_eq!(ledger.get_balance(account).unwrap(), Decimal::ZERO);

    let withdrawals = ledger
        .get_transactions(account, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
        .unwrap()
        .into_iter()
        .filter(|tx| tx.tx_type == TransactionType::Withdraw)
        .count();
    assert_eq!(withdrawals, 100);
}

#[test]
fn test_transfers_conserve_total_balance() {
    let ledger = Arc::new(Ledger::new());
    let ids: Vec<u64> = (0..4)
        .map(|i| {
            let id = ledger.create_account(&format!("owner-{}", i)).unwrap().id;
            ledger.deposit(id, Decimal::new(250, 0)).unwrap();
            id
        })
        .collect();
    let total = Decimal::new(1000, 0);

    let stop = Arc::new(AtomicBool::new(false));
    let mut workers = vec![];
    for t in 0..THREADS {
        let ledger = Arc::clone(&ledger);
        let ids = ids.clone();
        workers.push(thread::spawn(move || {
            for round in 0..300 {
                let from = ids[(t + round) % ids.len()];
                // Offset is always odd, so `to` never equals `from`.
                let to = ids[(t + round * 3 + 1) % ids.len()];
                match ledger.transfer(from, to, Decimal::new(7, 0)) {
                    Ok(_) | Err(LedgerError::InsufficientFunds { .. }) => {}
                    Err(other) => panic!("unexpected error: {}", other),
                }
            }
        }));
    }

    let observer = {
        let ledger = Arc::clone(&ledger);
        let stop = Arc::clone(&stop);
        let ids = ids.clone();
        thread::spawn(move || {
            let mut snapshots = 0;
            while !stop.load(Ordering::SeqCst) {
                let accounts = ledger.accounts().unwrap();
                assert!(accounts.iter().all(|a| a.balance >= Decimal::ZERO));
                let sum: Decimal = accounts.iter().map(|a| a.balance).sum();
                assert_eq!(sum, total, "snapshot {} saw a half-applied transfer", snapshots);
                snapshots += 1;
            }
        })
    };

    for worker in workers {
        worker.join().unwrap();
    }
    stop.store(true, Ordering::SeqCst);
    observer.join().unwrap();

    let final_total: Decimal = ids
        .iter()
        .map(|id| ledger.get_balance(*id).unwrap())
        .sum();
    assert_eq!(final_total, total);
}

#[test]
fn test_unknown_accounts_fail_without_disturbing_known_ones() {
    let ledger = Arc::new(Ledger::new());
    let account = ledger.create_account("Alice").unwrap().id;

    let mut handles = vec![];
    for t in 0..THREADS {
        let ledger = Arc::clone(&ledger);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let missing = 1_000 + (t * 100 + i) as u64;
                assert_eq!(
                    ledger.deposit(missing, Decimal::ONE).unwrap_err(),
                    LedgerError::account_not_found(missing)
                );
                ledger.deposit(account, Decimal::ONE).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(
        ledger.get_balance(account).unwrap(),
        Decimal::new((THREADS * 100) as i64, 0)
    );
    assert_eq!(ledger.account_store().len(), 1);
}

/// Account store that stalls after every save
#[derive(Debug, Default)]
struct SlowStore {
    inner: InMemoryAccountStore,
}

impl AccountStore for SlowStore {
    fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.inner.get(id)
    }

    fn create(&self, owner: &str) -> Result<Account, LedgerError> {
        self.inner.create(owner)
    }

    fn save(&self, account: Account) -> Result<Account, LedgerError> {
        let saved = self.inner.save(account);
        thread::sleep(Duration::from_millis(20));
        saved
    }

    fn all(&self) -> Result<Vec<Account>, LedgerError> {
        self.inner.all()
    }
}

/// Transaction log that stalls before every append
#[derive(Debug, Default)]
struct SlowLog {
    inner: InMemoryTransactionLog,
}

impl TransactionLog for SlowLog {
    fn append(&self, entry: NewTransaction) -> Result<Transaction, LedgerError> {
        thread::sleep(Duration::from_millis(20));
        self.inner.append(entry)
    }

    fn query(
        &self,
        account: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.inner.query(account, from, to)
    }
}

fn slow_ledger() -> (Arc<Ledger<SlowStore, SlowLog>>, AccountId, AccountId) {
    let ledger = Ledger::with_parts(SlowStore::default(), SlowLog::default(), Arc::new(SystemClock));
    let a = ledger.create_account("A").unwrap().id;
    let b = ledger.create_account("B").unwrap().id;
    ledger.deposit(a, Decimal::new(100, 0)).unwrap();
    (Arc::new(ledger), a, b)
}

#[test]
fn test_account_snapshot_never_sees_half_a_transfer() {
    let (ledger, a, b) = slow_ledger();
    let queries = LedgerQueries::new(Arc::clone(&ledger));

    let transfer = {
        let ledger = Arc::clone(&ledger);
        thread::spawn(move || ledger.transfer(a, b, Decimal::new(40, 0)).unwrap())
    };
    // Lands between the debit and the credit of the transfer commit.
    thread::sleep(Duration::from_millis(10));

    let snapshot = queries.accounts().unwrap();
    transfer.join().unwrap();

    let balances: Vec<(AccountId, Decimal)> =
        snapshot.iter().map(|account| (account.id, account.balance)).collect();
    let total: Decimal = balances.iter().map(|(_, balance)| *balance).sum();
    assert_eq!(total, Decimal::new(100, 0), "snapshot: {:?}", balances);
    assert!(
        balances == vec![(a, Decimal::new(100, 0)), (b, Decimal::ZERO)]
            || balances == vec![(a, Decimal::new(60, 0)), (b, Decimal::new(40, 0))],
        "snapshot: {:?}",
        balances
    );
}

#[test]
fn test_transaction_export_never_sees_half_a_transfer() {
    let (ledger, a, b) = slow_ledger();
    let queries = LedgerQueries::new(Arc::clone(&ledger));

    let transfer = {
        let ledger = Arc::clone(&ledger);
        thread::spawn(move || ledger.transfer(a, b, Decimal::new(40, 0)).unwrap())
    };
    // Lands between the two appends of the transfer commit.
    thread::sleep(Duration::from_millis(70));

    let exported = queries.all_transactions().unwrap();
    transfer.join().unwrap();

    let net: Decimal = exported
        .iter()
        .map(|tx| match tx.tx_type {
            TransactionType::Deposit => tx.amount,
            TransactionType::Withdraw => -tx.amount,
        })
        .sum();
    assert_eq!(net, Decimal::new(100, 0), "export: {:?}", exported);
    assert!(
        exported.len() == 1 || exported.len() == 3,
        "export: {:?}",
        exported
    );
}
