use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory, its backups directory and the initial `config.json`.
///
/// # Errors
/// - Returns an error if any file operations fail, or if the directory is already initialized.
pub async fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home)
        .await
        .context("Unable to create the ledger directory and config")?;
    Ok(format!(
        "Successfully created the ledger directory at {}",
        config.root().display()
    )
    .into())
}
