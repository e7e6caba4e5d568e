//! In-progress transaction entry with live category suggestions.

use chrono::{DateTime, Utc};
use fintrack_domain::{Transaction, TransactionDraft, TransactionId, TransactionKind};

use crate::{prediction::predict, CoreError, CoreResult, Prediction};

/// Form state behind the add/edit transaction screen.
///
/// The predictor runs on every name change but only writes the category
/// while `user_override` is unset; picking a category by hand sets it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub name: String,
    pub amount: String,
    pub kind: TransactionKind,
    pub category: String,
    pub note: String,
    pub timestamp: Option<DateTime<Utc>>,
    editing: Option<TransactionId>,
    user_override: bool,
    last_prediction: Option<Prediction>,
}

impl EntryForm {
    pub fn new(default_category: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            amount: String::new(),
            kind: TransactionKind::Expense,
            category: default_category.into(),
            note: String::new(),
            timestamp: None,
            editing: None,
            user_override: false,
            last_prediction: None,
        }
    }

    /// Prefills the form from a stored transaction. The stored category counts
    /// as an explicit choice.
    pub fn edit(txn: &Transaction) -> Self {
        Self {
            name: txn.name.clone(),
            amount: txn.amount.to_string(),
            kind: txn.kind,
            category: txn.category.clone(),
            note: txn.note.clone(),
            timestamp: Some(txn.timestamp),
            editing: txn.id.clone(),
            user_override: true,
            last_prediction: None,
        }
    }

    pub fn editing(&self) -> Option<&TransactionId> {
        self.editing.as_ref()
    }

    pub fn user_override(&self) -> bool {
        self.user_override
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.last_prediction.as_ref()
    }

    /// Updates the name and re-runs the predictor against the current ledger
    /// and category names.
    pub fn on_name_changed(
        &mut self,
        name: impl Into<String>,
        history: &[Transaction],
        categories: &[String],
    ) -> &Prediction {
        self.name = name.into();
        let prediction = predict(Some(&self.name), history, categories);
        if !self.user_override {
            if let Some(category) = prediction.category() {
                self.category = category.to_string();
            }
        }
        self.last_prediction.insert(prediction)
    }

    pub fn select_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.user_override = true;
    }

    pub fn reset_override(&mut self) {
        self.user_override = false;
    }

    /// Produces the draft to save. The name is required at this level even
    /// though the store would fall back to a placeholder.
    pub fn into_draft(self) -> CoreResult<TransactionDraft> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("transaction name is required".into()));
        }
        let mut draft = TransactionDraft::new(self.name, self.amount, self.kind, self.category)
            .with_note(self.note);
        draft.timestamp = self.timestamp;
        draft.validate()?;
        Ok(draft)
    }
}
