//! Domain models for ledger transactions and user-entered drafts.

use std::{error::Error, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;

/// Name given to transactions saved without one.
pub const UNTITLED: &str = "Untitled";

/// Opaque identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Direction of money flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expense" | "out" | "-" => Some(TransactionKind::Expense),
            "income" | "in" | "+" => Some(TransactionKind::Income),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        };
        f.write_str(label)
    }
}

/// A normalized ledger entry as held in the local projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TransactionId>,
    pub name: String,
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default)]
    pub note: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        name: impl Into<String>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            name: name_or_untitled(name.into()),
            kind,
            category: category.into(),
            note: String::new(),
            amount,
            timestamp,
        }
    }

    pub fn with_id(mut self, id: impl Into<TransactionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl NamedEntity for Transaction {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        let sign = if self.is_income() { '+' } else { '-' };
        format!(
            "{} {} {}{:.2} [{}]",
            self.timestamp.format("%Y-%m-%d"),
            self.name,
            sign,
            self.amount,
            self.category
        )
    }
}

/// User-entered transaction fields, before validation.
///
/// The amount is kept as the raw text the user typed so it can be rejected
/// before anything reaches a remote store.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub name: String,
    pub amount: String,
    pub kind: TransactionKind,
    pub category: String,
    pub note: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        kind: TransactionKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            kind,
            category: category.into(),
            note: String::new(),
            timestamp: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Checks every field and returns the coerced amount.
    pub fn validate(&self) -> Result<f64, DraftError> {
        if self.category.trim().is_empty() {
            return Err(DraftError::BlankCategory);
        }
        parse_amount(&self.amount)
    }

    /// Builds the normalized transaction this draft describes, stamping it with
    /// `now` when the user did not pick a date.
    pub fn into_transaction(self, now: DateTime<Utc>) -> Result<Transaction, DraftError> {
        let amount = self.validate()?;
        Ok(Transaction {
            id: None,
            name: name_or_untitled(self.name),
            kind: self.kind,
            category: self.category.trim().to_string(),
            note: self.note,
            amount,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}

impl From<&Transaction> for TransactionDraft {
    fn from(txn: &Transaction) -> Self {
        Self {
            name: txn.name.clone(),
            amount: txn.amount.to_string(),
            kind: txn.kind,
            category: txn.category.clone(),
            note: txn.note.clone(),
            timestamp: Some(txn.timestamp),
        }
    }
}

/// Reasons a draft is refused before any remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftError {
    BlankCategory,
    NonNumericAmount(String),
    NegativeAmount(f64),
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::BlankCategory => f.write_str("category is required"),
            DraftError::NonNumericAmount(raw) => write!(f, "amount `{raw}` is not a number"),
            DraftError::NegativeAmount(value) => {
                write!(f, "amount must not be negative (got {value})")
            }
        }
    }
}

impl Error for DraftError {}

/// Coerces user-entered amount text into a non-negative finite number.
pub fn parse_amount(raw: &str) -> Result<f64, DraftError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| DraftError::NonNumericAmount(raw.to_string()))?;
    if !value.is_finite() {
        return Err(DraftError::NonNumericAmount(raw.to_string()));
    }
    if value < 0.0 {
        return Err(DraftError::NegativeAmount(value));
    }
    Ok(value)
}

pub(crate) fn name_or_untitled(name: String) -> String {
    if name.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        name
    }
}
