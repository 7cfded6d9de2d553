//! Lenient query predicate over transactions.

use crate::model::{Transaction, TransactionType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

const START_KEY: &str = "start";
const END_KEY: &str = "end";
const TYPE_KEY: &str = "type";
const MIN_KEY: &str = "min";
const MAX_KEY: &str = "max";

/// A conjunction of optional constraints. A `None` field does not constrain anything, so the
/// default (empty) filter matches every transaction. All bounds are inclusive.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    kind: Option<TransactionType>,
    min_amount: Option<Decimal>,
    max_amount: Option<Decimal>,
}

impl Filter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a filter from query key-value pairs using the keys `start`, `end`, `type`, `min`
    /// and `max`.
    ///
    /// Decoding never fails. Empty values are treated as absent, a value that cannot be parsed
    /// drops only its own constraint, and unknown keys are ignored.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut filter = Filter::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key {
                START_KEY => set_lenient(&mut filter.start_date, key, value),
                END_KEY => set_lenient(&mut filter.end_date, key, value),
                TYPE_KEY => set_lenient(&mut filter.kind, key, value),
                MIN_KEY => set_lenient(&mut filter.min_amount, key, value),
                MAX_KEY => set_lenient(&mut filter.max_amount, key, value),
                _ => debug!("Ignoring unknown filter key '{key}'"),
            }
        }
        filter
    }

    /// Decodes a filter from a URL query string such as `start=2024-01-01&type=expense`.
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_type(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_min_amount(mut self, amount: Decimal) -> Self {
        self.min_amount = Some(amount);
        self
    }

    pub fn with_max_amount(mut self, amount: Decimal) -> Self {
        self.max_amount = Some(amount);
        self
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn kind(&self) -> Option<TransactionType> {
        self.kind
    }

    pub fn min_amount(&self) -> Option<Decimal> {
        self.min_amount
    }

    pub fn max_amount(&self) -> Option<Decimal> {
        self.max_amount
    }

    /// Returns true if the filter has no constraints (matches everything).
    pub fn is_empty(&self) -> bool {
        self == &Filter::default()
    }

    /// Returns true if `transaction` satisfies every constraint that is present.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let date = transaction.date();
        let amount = transaction.amount().value();
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
            && self.kind.is_none_or(|kind| transaction.kind() == kind)
            && self.min_amount.is_none_or(|min| amount >= min)
            && self.max_amount.is_none_or(|max| amount <= max)
    }

    /// Keeps the matching transactions, in their original order.
    pub fn apply(&self, transactions: impl IntoIterator<Item = Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|t| self.matches(t))
            .collect()
    }
}

/// Parses `value` into `field`. A value that cannot be parsed leaves `field` as it was.
fn set_lenient<T: FromStr>(field: &mut Option<T>, key: &str, value: &str) {
    match T::from_str(value) {
        Ok(parsed) => *field = Some(parsed),
        Err(_) => debug!("Ignoring filter value '{value}' for '{key}': unable to parse"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;

    fn txn(date: &str, kind: TransactionType, amount: &str) -> Transaction {
        Transaction::new(
            format!("{date}-{amount}"),
            NaiveDate::from_str(date).unwrap(),
            kind,
            "misc",
            Amount::from_str(amount).unwrap(),
            None,
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&txn("2024-01-01", TransactionType::Expense, "0")));
        assert!(filter.matches(&txn("1999-12-31", TransactionType::Income, "99999")));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = Filter::new()
            .with_start_date(NaiveDate::from_str("2024-01-10").unwrap())
            .with_end_date(NaiveDate::from_str("2024-01-20").unwrap());
        assert!(!filter.matches(&txn("2024-01-09", TransactionType::Expense, "1")));
        assert!(filter.matches(&txn("2024-01-10", TransactionType::Expense, "1")));
        assert!(filter.matches(&txn("2024-01-20", TransactionType::Expense, "1")));
        assert!(!filter.matches(&txn("2024-01-21", TransactionType::Expense, "1")));
    }

    #[test]
    fn test_amount_bounds_are_inclusive() {
        let filter = Filter::new()
            .with_min_amount(dec("10"))
            .with_max_amount(dec("20"));
        assert!(!filter.matches(&txn("2024-01-01", TransactionType::Expense, "9.99")));
        assert!(filter.matches(&txn("2024-01-01", TransactionType::Expense, "10.00")));
        assert!(filter.matches(&txn("2024-01-01", TransactionType::Income, "20")));
        assert!(!filter.matches(&txn("2024-01-01", TransactionType::Income, "20.01")));
    }

    #[test]
    fn test_type_must_match_exactly() {
        let filter = Filter::new().with_type(TransactionType::Income);
        assert!(filter.matches(&txn("2024-01-01", TransactionType::Income, "1")));
        assert!(!filter.matches(&txn("2024-01-01", TransactionType::Expense, "1")));
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let filter = Filter::new()
            .with_type(TransactionType::Expense)
            .with_min_amount(dec("50"));
        assert!(filter.matches(&txn("2024-01-01", TransactionType::Expense, "75")));
        assert!(!filter.matches(&txn("2024-01-01", TransactionType::Expense, "25")));
        assert!(!filter.matches(&txn("2024-01-01", TransactionType::Income, "75")));
    }

    #[test]
    fn test_from_query_parses_all_fields() {
        let filter =
            Filter::from_query("start=2024-01-01&end=2024-12-31&type=expense&min=5&max=100.5");
        assert_eq!(
            filter,
            Filter::new()
                .with_start_date(NaiveDate::from_str("2024-01-01").unwrap())
                .with_end_date(NaiveDate::from_str("2024-12-31").unwrap())
                .with_type(TransactionType::Expense)
                .with_min_amount(dec("5"))
                .with_max_amount(dec("100.5"))
        );
    }

    #[test]
    fn test_malformed_values_drop_only_their_constraint() {
        let filter =
            Filter::from_query("start=yesterday&end=2024-06-30&type=transfer&min=abc&max=10");
        assert_eq!(filter.start_date(), None);
        assert_eq!(
            filter.end_date(),
            Some(NaiveDate::from_str("2024-06-30").unwrap())
        );
        assert_eq!(filter.kind(), None);
        assert_eq!(filter.min_amount(), None);
        assert_eq!(filter.max_amount(), Some(dec("10")));
    }

    #[test]
    fn test_repeated_key_keeps_last_valid_value() {
        let filter = Filter::from_query("min=5&min=abc&start=2024-01-01&start=&type=income");
        assert_eq!(filter.min_amount(), Some(dec("5")));
        assert_eq!(
            filter.start_date(),
            Some(NaiveDate::from_str("2024-01-01").unwrap())
        );

        let filter = Filter::from_query("max=5&max=7");
        assert_eq!(filter.max_amount(), Some(dec("7")));
    }

    #[test]
    fn test_empty_values_and_unknown_keys_are_ignored() {
        let filter = Filter::from_query("start=&type=&min=&color=blue");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_apply_preserves_order() {
        let items = vec![
            txn("2024-03-01", TransactionType::Expense, "30"),
            txn("2024-01-01", TransactionType::Expense, "5"),
            txn("2024-02-01", TransactionType::Expense, "40"),
        ];
        let filter = Filter::new().with_min_amount(dec("10"));
        let kept: Vec<String> = filter
            .apply(items)
            .iter()
            .map(|t| t.date().to_string())
            .collect();
        assert_eq!(kept, vec!["2024-03-01", "2024-02-01"]);
    }
}
