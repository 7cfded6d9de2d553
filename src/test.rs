//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Transaction, TransactionType};
use crate::store::Store;
use crate::Config;
use chrono::NaiveDate;
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a ledger home directory with a Config and a seeded ledger.
/// Holds TempDir to keep the directory alive for the duration of the test.
///
/// The seeded transactions, newest first, are:
///
/// | id         | date       | type    | category | amount  |
/// |------------|------------|---------|----------|---------|
/// | rent-mar   | 2024-03-15 | expense | rent     | 900     |
/// | food-mar   | 2024-03-02 | expense | food     | 45.10   |
/// | pay-feb    | 2024-02-28 | income  | salary   | 2500    |
/// | food-jan-2 | 2024-01-20 | expense | food     | 12.40   |
/// | food-jan-1 | 2024-01-05 | expense | food     | 30      |
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger");
        let config = Config::create(&root).await.unwrap();

        // Written out of date order so that opening the ledger has to sort.
        let seed = vec![
            transaction("food-jan-1", "2024-01-05", TransactionType::Expense, "food", "30"),
            transaction("pay-feb", "2024-02-28", TransactionType::Income, "salary", "2500"),
            transaction("rent-mar", "2024-03-15", TransactionType::Expense, "rent", "900"),
            transaction("food-jan-2", "2024-01-20", TransactionType::Expense, "food", "12.40"),
            transaction("food-mar", "2024-03-02", TransactionType::Expense, "food", "45.10"),
        ];
        Store::new(config.data_path()).save_all(&seed);

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

fn transaction(
    id: &str,
    date: &str,
    kind: TransactionType,
    category: &str,
    amount: &str,
) -> Transaction {
    Transaction::new(
        id,
        NaiveDate::from_str(date).unwrap(),
        kind,
        category,
        Amount::from_str(amount).unwrap(),
        None,
    )
}
