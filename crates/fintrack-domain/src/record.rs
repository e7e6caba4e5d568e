//! Wire representation of transactions as exchanged with the remote store.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::transaction::{name_or_untitled, Transaction, TransactionId, TransactionKind};

/// A timestamp in whichever shape the remote provider delivered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteTimestamp {
    /// Provider temporal type: seconds plus nanoseconds since the epoch.
    Provider { seconds: i64, nanoseconds: u32 },
    /// Milliseconds since the epoch.
    Millis(i64),
    /// RFC 3339 text or a bare `YYYY-MM-DD` date.
    Text(String),
}

impl RemoteTimestamp {
    pub fn from_instant(at: DateTime<Utc>) -> Self {
        RemoteTimestamp::Provider {
            seconds: at.timestamp(),
            nanoseconds: at.timestamp_subsec_nanos(),
        }
    }

    /// Coerces the remote value into a canonical instant.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            RemoteTimestamp::Provider {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
            RemoteTimestamp::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            RemoteTimestamp::Text(raw) => parse_text_timestamp(raw),
        }
    }
}

fn parse_text_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// A transaction document as stored remotely. Every field except the amount
/// and the date may be missing on older documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub date: RemoteTimestamp,
}

impl TransactionRecord {
    /// Builds the document written for a validated transaction.
    pub fn from_transaction(txn: &Transaction) -> Self {
        Self {
            id: txn.id.as_ref().map(|id| id.as_str().to_string()),
            user_id: None,
            name: Some(txn.name.clone()),
            amount: txn.amount,
            kind: Some(txn.kind),
            category: Some(txn.category.clone()),
            note: Some(txn.note.clone()),
            date: RemoteTimestamp::from_instant(txn.timestamp),
        }
    }

    /// Normalizes the document into a projection entry, filling defaults for
    /// missing fields. Fails only when the timestamp cannot be coerced.
    pub fn normalize(&self, default_category: &str) -> Result<Transaction, RecordError> {
        let timestamp = self
            .date
            .to_instant()
            .ok_or_else(|| RecordError::InvalidTimestamp {
                id: self.id.clone(),
                raw: self.date.clone(),
            })?;
        let category = match self.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_category.to_string(),
        };
        Ok(Transaction {
            id: self.id.clone().map(TransactionId::new),
            name: name_or_untitled(self.name.clone().unwrap_or_default()),
            kind: self.kind.unwrap_or_default(),
            category,
            note: self.note.clone().unwrap_or_default(),
            amount: self.amount,
            timestamp,
        })
    }

    pub fn category_is(&self, name: &str) -> bool {
        self.category.as_deref() == Some(name)
    }
}

/// A remote document that cannot enter the projection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    InvalidTimestamp {
        id: Option<String>,
        raw: RemoteTimestamp,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidTimestamp { id, raw } => write!(
                f,
                "record {} has an unreadable date {:?}",
                id.as_deref().unwrap_or("<unsaved>"),
                raw
            ),
        }
    }
}

impl std::error::Error for RecordError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: RemoteTimestamp) -> TransactionRecord {
        TransactionRecord {
            id: Some("abc".into()),
            user_id: Some("u1".into()),
            name: None,
            amount: 9.5,
            kind: None,
            category: None,
            note: None,
            date,
        }
    }

    #[test]
    fn provider_millis_and_text_agree() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let shapes = [
            RemoteTimestamp::from_instant(expected),
            RemoteTimestamp::Millis(expected.timestamp_millis()),
            RemoteTimestamp::Text("2025-01-02T03:04:05Z".into()),
            RemoteTimestamp::Text("2025-01-02T05:04:05+02:00".into()),
        ];

        for shape in shapes {
            assert_eq!(shape.to_instant(), Some(expected), "{shape:?}");
        }
    }

    #[test]
    fn bare_date_text_is_midnight_utc() {
        let parsed = RemoteTimestamp::Text("2024-07-01".into()).to_instant();

        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn normalize_fills_missing_fields() {
        let txn = record(RemoteTimestamp::Millis(0))
            .normalize("Other")
            .expect("valid record");

        assert_eq!(txn.id, Some(TransactionId::new("abc")));
        assert_eq!(txn.name, "Untitled");
        assert_eq!(txn.category, "Other");
        assert_eq!(txn.note, "");
        assert_eq!(txn.kind, TransactionKind::Expense);
    }

    #[test]
    fn normalize_rejects_garbage_dates() {
        let err = record(RemoteTimestamp::Text("yesterday-ish".into()))
            .normalize("Other")
            .unwrap_err();

        assert!(matches!(err, RecordError::InvalidTimestamp { .. }));
    }

    #[test]
    fn deserializes_every_timestamp_shape() {
        let provider: TransactionRecord = serde_json::from_str(
            r#"{"amount": 3, "type": "income", "date": {"seconds": 60, "nanoseconds": 0}}"#,
        )
        .expect("provider shape");
        let millis: TransactionRecord =
            serde_json::from_str(r#"{"amount": 3, "date": 60000}"#).expect("millis shape");
        let text: TransactionRecord =
            serde_json::from_str(r#"{"amount": 3, "date": "1970-01-01T00:01:00Z"}"#)
                .expect("text shape");

        assert_eq!(provider.kind, Some(TransactionKind::Income));
        assert_eq!(provider.date.to_instant(), millis.date.to_instant());
        assert_eq!(millis.date.to_instant(), text.date.to_instant());
    }
}
