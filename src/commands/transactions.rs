//! Handlers for listing and changing transactions.

use crate::args::{AddArgs, DeleteArgs, ImportArgs, ListArgs};
use crate::commands::{blocking, plural, Out};
use crate::model::{Filter, Transaction};
use crate::store::Store;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use tracing::debug;

/// Lists transactions newest-first. Filter values that cannot be parsed are ignored.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<Transaction>>> {
    let filter = Filter::from_pairs(args.pairs());
    debug!("Listing transactions with {filter:?}");
    let transactions = blocking(move || config.ledger().query(&filter)).await?;
    let message = format!("Found {}", plural(transactions.len(), "transaction", "transactions"));
    Ok(Out::new(message, transactions))
}

/// Records a new transaction. Returns the stored transaction, including its id.
///
/// # Errors
/// - The amount is missing, not a number, or negative.
/// - The date is given but is not a `YYYY-MM-DD` date.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let transaction =
        Transaction::from_form(args.pairs()).context("Unable to create the transaction")?;
    let added = transaction.clone();
    blocking(move || config.ledger().add(added)).await?;
    Ok(Out::new(
        format!("Added transaction {}", transaction.id()),
        transaction,
    ))
}

/// Deletes a transaction by id. An unknown id is not an error; the returned structure says
/// whether anything was deleted.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<bool>> {
    let id = args.id().to_string();
    let removed = blocking(move || config.ledger().delete_by_id(&id)).await?;
    let message = if removed {
        format!("Deleted transaction {}", args.id())
    } else {
        format!("Transaction {} not found", args.id())
    };
    Ok(Out::new(message, removed))
}

/// Replaces all transactions with the ones in `args.file()`, newest first. The current
/// transactions file is backed up before it is overwritten.
///
/// # Errors
/// - The import file does not exist or cannot be read.
/// - The backup cannot be written.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<usize>> {
    let source = args.file().to_path_buf();
    if !utils::is_file(&source).await {
        bail!("The import file '{}' does not exist", source.display())
    }
    let mut transactions = blocking(move || {
        Store::new(&source)
            .try_load_all()
            .with_context(|| format!("Unable to import {}", source.display()))
    })
    .await??;
    transactions.sort_by(|a, b| b.date().cmp(&a.date()));

    if let Some(backup) = config.backup().copy_data_file().await? {
        debug!("Saved backup to {}", backup.display());
    }

    let count = transactions.len();
    blocking(move || config.ledger().replace_all(transactions)).await?;
    Ok(Out::new(
        format!("Imported {}", plural(count, "transaction", "transactions")),
        count,
    ))
}
