//! Flat-file persistence for the ledger.
//!
//! Each transaction is one tab-separated line: `id`, `date`, `type`, `category`, `amount`,
//! `note`. There is no header and no quoting. The public operations never fail: problems are
//! logged with `warn!` and the operation has no effect. Each has a `try_` twin that returns the
//! error instead.

use crate::model::{Amount, Transaction, TransactionType};
use crate::Result;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

const DELIMITER: u8 = b'\t';
const FIELD_COUNT: usize = 6;

/// The on-disk shape of a transaction, in column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineRecord {
    id: String,
    date: NaiveDate,
    kind: TransactionType,
    category: String,
    amount: Amount,
    note: String,
}

impl From<&Transaction> for LineRecord {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id().to_string(),
            date: t.date(),
            kind: t.kind(),
            category: t.category().to_string(),
            amount: t.amount(),
            note: t.note().unwrap_or_default().to_string(),
        }
    }
}

impl TryFrom<LineRecord> for Transaction {
    type Error = crate::Error;

    fn try_from(line: LineRecord) -> Result<Self> {
        ensure!(!line.id.trim().is_empty(), "Transaction id is empty");
        Ok(Transaction::new(
            line.id,
            line.date,
            line.kind,
            line.category,
            line.amount,
            Some(line.note.as_str()),
        ))
    }
}

/// The durable copy of the ledger: a single tab-separated file.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Store {
    /// Creates a store backed by the file at `path`, creating an empty file (and its parent
    /// directories) if it does not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        if let Err(e) = store.ensure_file() {
            warn!("{e:#}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every transaction in file order. Lines that cannot be parsed are skipped. Returns
    /// an empty list if the file cannot be read.
    pub fn load_all(&self) -> Vec<Transaction> {
        self.try_load_all().unwrap_or_else(|e| {
            warn!("Unable to load transactions: {e:#}");
            Vec::new()
        })
    }

    /// Replaces the file contents with exactly `transactions`, one line each, in order.
    pub fn save_all(&self, transactions: &[Transaction]) {
        if let Err(e) = self.try_save_all(transactions) {
            warn!("Unable to save transactions: {e:#}");
        }
    }

    /// Adds one line to the end of the file without rewriting the rest.
    pub fn append(&self, transaction: &Transaction) {
        if let Err(e) = self.try_append(transaction) {
            warn!("Unable to append transaction {}: {e:#}", transaction.id());
        }
    }

    pub fn try_load_all(&self) -> Result<Vec<Transaction>> {
        let _guard = self.guard();
        self.ensure_file()?;
        let file = File::open(&self.path)
            .with_context(|| format!("Unable to open {}", self.path.display()))?;
        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(file);

        let mut transactions = Vec::new();
        for (ix, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(e)
                        .with_context(|| format!("Unable to read {}", self.path.display()))
                }
                Err(e) => {
                    warn!("Skipping unreadable record {}: {e}", ix + 1);
                    continue;
                }
            };
            match parse_record(record) {
                Ok(Some(transaction)) => transactions.push(transaction),
                Ok(None) => {}
                Err(e) => warn!("Skipping malformed record {}: {e:#}", ix + 1),
            }
        }
        debug!(
            "Loaded {} transactions from {}",
            transactions.len(),
            self.path.display()
        );
        Ok(transactions)
    }

    /// Writes to a sibling temporary file and then renames it over the data file.
    pub fn try_save_all(&self, transactions: &[Transaction]) -> Result<()> {
        let _guard = self.guard();
        self.ensure_parent()?;
        let tmp = self.temp_path();
        let result = self.write_and_replace(&tmp, transactions);
        if result.is_err() && tmp.exists() {
            let _ = std::fs::remove_file(&tmp);
        }
        result
    }

    fn write_and_replace(&self, tmp: &Path, transactions: &[Transaction]) -> Result<()> {
        let mut file = File::create(tmp)
            .with_context(|| format!("Unable to create {}", tmp.display()))?;
        {
            let mut writer = line_writer(&mut file);
            for transaction in transactions {
                writer
                    .serialize(LineRecord::from(transaction))
                    .with_context(|| format!("Unable to write {}", tmp.display()))?;
            }
            writer
                .flush()
                .with_context(|| format!("Unable to write {}", tmp.display()))?;
        }
        file.sync_all()
            .with_context(|| format!("Unable to sync {}", tmp.display()))?;
        std::fs::rename(tmp, &self.path).with_context(|| {
            format!(
                "Unable to move '{}' to '{}'",
                tmp.display(),
                self.path.display()
            )
        })?;
        debug!(
            "Saved {} transactions to {}",
            transactions.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn try_append(&self, transaction: &Transaction) -> Result<()> {
        let _guard = self.guard();
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open {} for appending", self.path.display()))?;
        let mut writer = line_writer(&mut file);
        writer
            .serialize(LineRecord::from(transaction))
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .with_context(|| format!("Unable to append to {}", self.path.display()))
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory {}", parent.display())),
            _ => Ok(()),
        }
    }

    fn ensure_file(&self) -> Result<()> {
        if self.path.is_file() {
            return Ok(());
        }
        self.ensure_parent()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Unable to create {}", self.path.display()))?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn line_writer<W: Write>(w: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(w)
}

/// Returns `Ok(None)` for a blank line. A line without the trailing note column is accepted.
fn parse_record(mut record: StringRecord) -> Result<Option<Transaction>> {
    if record.iter().all(|field| field.trim().is_empty()) {
        return Ok(None);
    }
    if record.len() == FIELD_COUNT - 1 {
        record.push_field("");
    }
    ensure!(
        record.len() == FIELD_COUNT,
        "Expected {FIELD_COUNT} fields but found {}",
        record.len()
    );
    let line: LineRecord = record
        .deserialize(None)
        .context("Unable to parse fields")?;
    Transaction::try_from(line).map(Some)
}
