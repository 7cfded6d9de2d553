//! The live, in-memory transaction set and its synchronization with the `Store`.

use crate::model::{Filter, Transaction};
use crate::store::Store;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// The single source of truth for the ledger while the process runs.
///
/// Every operation holds one lock for its full duration, including the write to the `Store`, so
/// operations never interleave and readers never observe a partial mutation. Memory is updated
/// first and the file second; a failed write is logged by the `Store` and is not rolled back.
///
/// Share a `Ledger` between threads with `Arc<Ledger>`.
#[derive(Debug)]
pub struct Ledger {
    store: Store,
    transactions: Mutex<Vec<Transaction>>,
}

impl Ledger {
    /// Loads every transaction from `store` and orders them newest-first by date. Transactions
    /// that share a date keep their file order.
    pub fn open(store: Store) -> Self {
        let mut transactions = store.load_all();
        transactions.sort_by(|a, b| b.date().cmp(&a.date()));
        info!(
            "Opened ledger with {} transactions from {}",
            transactions.len(),
            store.path().display()
        );
        Self {
            store,
            transactions: Mutex::new(transactions),
        }
    }

    /// Opens the ledger backed by the file at `path`.
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        Self::open(Store::new(path))
    }

    /// Returns an independent copy of the current transactions in their current order.
    pub fn list(&self) -> Vec<Transaction> {
        self.lock().clone()
    }

    /// Returns the transactions that match `filter`, in list order.
    pub fn query(&self, filter: &Filter) -> Vec<Transaction> {
        let transactions = self.lock();
        transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Puts `transaction` first in the list, whatever its date, and appends it to the file.
    pub fn add(&self, transaction: Transaction) {
        let mut transactions = self.lock();
        debug!("Adding transaction {}", transaction.id());
        transactions.insert(0, transaction);
        self.store.append(&transactions[0]);
    }

    /// Swaps the whole set for `replacement` and rewrites the file to match.
    pub fn replace_all(&self, replacement: Vec<Transaction>) {
        let mut transactions = self.lock();
        debug!("Replacing all transactions with {}", replacement.len());
        *transactions = replacement;
        self.store.save_all(&transactions);
    }

    /// Removes every transaction with the given `id` and, if anything was removed, rewrites the
    /// file. Returns whether anything was removed.
    pub fn delete_by_id(&self, id: &str) -> bool {
        let mut transactions = self.lock();
        let before = transactions.len();
        transactions.retain(|t| t.id() != id);
        let removed = transactions.len() != before;
        if removed {
            debug!("Deleted transaction {id}");
            self.store.save_all(&transactions);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A panic while holding the lock cannot leave the vector half-mutated, so a poisoned lock
    /// is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Transaction>> {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
