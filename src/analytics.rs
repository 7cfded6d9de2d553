//! Aggregate views over the ledger: totals by category, totals by month, and overall totals.
//!
//! Aggregates are never cached. Each call takes a fresh snapshot from the `Ledger`.
//!
//! Amounts are summed as magnitudes: income and expenses both add to a group's total. `Totals`
//! is the one place where the two are netted against each other.

use crate::ledger::Ledger;
use crate::model::{Amount, Transaction, TransactionType};
use crate::Result;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// A calendar month. Orders chronologically and is written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// The month that `date` falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Invalid period '{s}', expected YYYY-MM"))?;
        Ok(Period::of(date))
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Period::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The total amount recorded under one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub category: String,
    pub total: Amount,
}

/// The total amount recorded in one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub period: Period,
    pub total: Amount,
}

/// Overall income and expense, and the difference between them.
#[derive(Debug, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: Amount,
    pub expense: Amount,
    /// `income - expense`, which may be negative.
    pub balance: Decimal,
}

/// One slice per distinct category, ordered by category name.
pub fn pie_by_category(transactions: &[Transaction]) -> Vec<PieSlice> {
    let mut groups: BTreeMap<&str, Amount> = BTreeMap::new();
    for t in transactions {
        let total = groups.entry(t.category()).or_default();
        *total = *total + t.amount();
    }
    groups
        .into_iter()
        .map(|(category, total)| PieSlice {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// One point per distinct month, oldest month first.
pub fn time_series_monthly(transactions: &[Transaction]) -> Vec<TimeSeriesPoint> {
    let mut groups: BTreeMap<Period, Amount> = BTreeMap::new();
    for t in transactions {
        let total = groups.entry(Period::of(t.date())).or_default();
        *total = *total + t.amount();
    }
    groups
        .into_iter()
        .map(|(period, total)| TimeSeriesPoint { period, total })
        .collect()
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let sum_of = |kind: TransactionType| -> Amount {
        transactions
            .iter()
            .filter(|t| t.kind() == kind)
            .map(Transaction::amount)
            .sum()
    };
    let income = sum_of(TransactionType::Income);
    let expense = sum_of(TransactionType::Expense);
    Totals {
        income,
        expense,
        balance: income.value() - expense.value(),
    }
}

/// Computes the aggregate views from the current contents of a shared `Ledger`.
#[derive(Debug, Clone)]
pub struct Analytics {
    ledger: Arc<Ledger>,
}

impl Analytics {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn pie_by_category(&self) -> Vec<PieSlice> {
        pie_by_category(&self.ledger.list())
    }

    pub fn time_series_monthly(&self) -> Vec<TimeSeriesPoint> {
        time_series_monthly(&self.ledger.list())
    }

    pub fn totals(&self) -> Totals {
        totals(&self.ledger.list())
    }
}
