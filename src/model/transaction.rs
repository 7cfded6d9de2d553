use crate::model::Amount;
use crate::utils::generate_transaction_id;
use crate::Result;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

const ID_KEY: &str = "id";
const DATE_KEY: &str = "date";
const TYPE_KEY: &str = "type";
const CATEGORY_KEY: &str = "category";
const AMOUNT_KEY: &str = "amount";
const NOTE_KEY: &str = "note";

/// Whether money came in or went out.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single dated monetary event in the ledger.
///
/// The `id` is assigned once, at creation, and never changes. The sign of the money movement is
/// carried by `kind`; `amount` is always a magnitude.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransactionFields")]
pub struct Transaction {
    id: String,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: String,
    amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// The decoded JSON shape of a `Transaction`, before it is cleaned up by `Transaction::new`.
#[derive(Deserialize)]
struct TransactionFields {
    id: String,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: TransactionType,
    category: String,
    amount: Amount,
    #[serde(default)]
    note: Option<String>,
}

impl From<TransactionFields> for Transaction {
    fn from(fields: TransactionFields) -> Self {
        Transaction::new(
            fields.id,
            fields.date,
            fields.kind,
            fields.category,
            fields.amount,
            fields.note.as_deref(),
        )
    }
}

impl Transaction {
    /// Creates a transaction. Tabs and line breaks in `id`, `category` and `note` are replaced
    /// with spaces, and an empty note becomes `None`. A blank `id` is replaced with a freshly
    /// generated one.
    pub fn new(
        id: impl AsRef<str>,
        date: NaiveDate,
        kind: TransactionType,
        category: impl AsRef<str>,
        amount: Amount,
        note: Option<&str>,
    ) -> Self {
        let id = sanitize(id.as_ref());
        let id = if id.trim().is_empty() {
            debug!("Blank transaction id, generating a new one");
            generate_transaction_id()
        } else {
            id
        };
        Self {
            id,
            date,
            kind,
            category: sanitize(category.as_ref()),
            amount,
            note: note.map(sanitize).filter(|n| !n.is_empty()),
        }
    }

    /// Decodes a transaction from a flat key-value form such as a submitted HTML form.
    ///
    /// Recognized keys are `id`, `date`, `type`, `category`, `amount` and `note`. Only `amount`
    /// is required. A missing `id` gets a freshly generated one, a missing `date` becomes today
    /// and a missing or unrecognized `type` becomes `expense`.
    ///
    /// # Errors
    /// - `amount` is missing, not a number, or negative.
    /// - `date` is present but is not a `YYYY-MM-DD` date.
    pub fn from_form<K, V, I>(pairs: I) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut form: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut take = |key: &str| form.remove(key).filter(|v| !v.trim().is_empty());

        let id = take(ID_KEY).unwrap_or_else(generate_transaction_id);

        let date = match take(DATE_KEY) {
            Some(s) => NaiveDate::from_str(s.trim())
                .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?,
            None => Local::now().date_naive(),
        };

        let kind = match take(TYPE_KEY) {
            Some(s) => TransactionType::from_str(s.trim()).unwrap_or_else(|_| {
                debug!("Unknown transaction type '{s}', using the default");
                TransactionType::default()
            }),
            None => TransactionType::default(),
        };

        let category = take(CATEGORY_KEY).unwrap_or_default();

        let amount = match take(AMOUNT_KEY) {
            Some(s) => {
                Amount::from_str(&s).with_context(|| format!("Invalid amount '{s}'"))?
            }
            None => bail!("An amount is required to create a transaction"),
        };

        let note = take(NOTE_KEY);

        Ok(Transaction::new(
            id,
            date,
            kind,
            category,
            amount,
            note.as_deref(),
        ))
    }

    /// Decodes a transaction from an `application/x-www-form-urlencoded` string.
    pub fn from_query(query: &str) -> Result<Self> {
        Self::from_form(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// The line format has no quoting, so the delimiter and line breaks cannot appear in a field.
fn sanitize(s: &str) -> String {
    s.replace(['\t', '\r', '\n'], " ")
}
