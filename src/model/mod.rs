//! Types that represent the core data model, such as `Transaction` and `Filter`.
mod amount;
mod filter;
mod transaction;

pub use amount::{Amount, AmountError};
pub use filter::Filter;
pub use transaction::{Transaction, TransactionType};
