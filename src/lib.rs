//! A personal finance ledger.
//!
//! The live transaction set is held by a [`Ledger`], which keeps a tab-separated file in sync
//! through a [`Store`]. Listings are narrowed with a [`model::Filter`] and summarized with
//! [`Analytics`].

pub mod analytics;
pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
mod store;
mod utils;

#[cfg(test)]
mod test;

pub use analytics::Analytics;
pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use ledger::Ledger;
pub use store::Store;
