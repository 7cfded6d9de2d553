//! These structs provide the CLI interface for the ledger CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: A personal finance ledger.
///
/// Records dated income and expense transactions in a tab-separated file and answers filtered
/// listings and two summaries: totals by category and totals by month.
///
/// Structured results are printed to stdout as JSON; messages and logs go to stderr.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the ledger home directory and its configuration file.
    Init,
    /// List transactions, newest first, optionally filtered.
    List(ListArgs),
    /// Record a new transaction.
    Add(AddArgs),
    /// Delete a transaction by its id.
    Delete(DeleteArgs),
    /// Replace every transaction with the contents of another ledger file. The current file is
    /// backed up first.
    Import(ImportArgs),
    /// Show the total amount per category.
    Pie,
    /// Show the total amount per month, oldest first.
    Series,
    /// Show total income, total expense and the balance.
    Totals,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger and its configuration are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// Args for the `ledger list` command.
///
/// Filter values are lenient: a value that cannot be understood is ignored rather than rejected.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Only transactions on or after this date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Only transactions on or before this date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Only transactions of this type: expense or income.
    #[arg(long = "type")]
    kind: Option<String>,

    /// Only transactions with at least this amount.
    #[arg(long)]
    min: Option<String>,

    /// Only transactions with at most this amount.
    #[arg(long)]
    max: Option<String>,
}

impl ListArgs {
    /// Returns the filter values as query-style key-value pairs.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("start", &self.start),
            ("end", &self.end),
            ("type", &self.kind),
            ("min", &self.min),
            ("max", &self.max),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect()
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_min(mut self, min: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn with_max(mut self, max: impl Into<String>) -> Self {
        self.max = Some(max.into());
        self
    }
}

/// Args for the `ledger add` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct AddArgs {
    /// The amount, a non-negative number such as 12.50. Whether it is money in or out is given
    /// by --type.
    #[arg(long)]
    amount: String,

    /// The date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// expense or income. Defaults to expense.
    #[arg(long = "type")]
    kind: Option<String>,

    /// A short label such as "groceries".
    #[arg(long)]
    category: Option<String>,

    /// Free-form text.
    #[arg(long)]
    note: Option<String>,

    /// The transaction id. A unique id is generated if not given.
    #[arg(long)]
    id: Option<String>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }

    /// Returns the values as key-value form pairs.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let optional = [
            ("date", &self.date),
            ("type", &self.kind),
            ("category", &self.category),
            ("note", &self.note),
            ("id", &self.id),
        ];
        std::iter::once(("amount", self.amount.as_str()))
            .chain(
                optional
                    .into_iter()
                    .filter_map(|(k, v)| v.as_deref().map(|v| (k, v))),
            )
            .collect()
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Args for the `ledger delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    #[arg(long)]
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `ledger import` command.
#[derive(Debug, Parser, Clone)]
pub struct ImportArgs {
    /// A tab-separated ledger file whose transactions will replace the current ones.
    file: PathBuf,
}

impl ImportArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filters() {
        let args = Args::try_parse_from([
            "ledger",
            "--ledger-home",
            "/tmp/ledger",
            "list",
            "--start",
            "2024-01-01",
            "--type",
            "income",
        ])
        .unwrap();
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger"));
        match args.command() {
            Command::List(list) => assert_eq!(
                list.pairs(),
                vec![("start", "2024-01-01"), ("type", "income")]
            ),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_requires_amount() {
        assert!(Args::try_parse_from(["ledger", "add", "--category", "food"]).is_err());
        let args =
            Args::try_parse_from(["ledger", "add", "--amount", "3.50", "--note", "tea"]).unwrap();
        match args.command() {
            Command::Add(add) => {
                assert_eq!(add.pairs(), vec![("amount", "3.50"), ("note", "tea")])
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_log_level() {
        let args = Args::try_parse_from(["ledger", "--log-level", "debug", "pie"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
