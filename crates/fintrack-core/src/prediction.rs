//! Three-tier category prediction from free-text input.
//!
//! Tiers are consulted in priority order and the first one producing a
//! positive-score winner decides:
//!
//! 1. the user's own history (only with at least [`HISTORY_THRESHOLD`] entries),
//! 2. the user's category names, in the order supplied,
//! 3. a fixed keyword table for common spending domains.
//!
//! The predictor is pure. Callers re-run it on every input change and are
//! responsible for not overriding a category the user picked explicitly
//! (see [`crate::EntryForm`]).

use std::{collections::HashSet, fmt};

use fintrack_domain::Transaction;

use crate::tokenizer::{tokenize, tokenize_str};

/// Minimum history length before the history tier is consulted.
pub const HISTORY_THRESHOLD: usize = 5;

/// Cold-start keyword table, in scoring order.
pub const DEFAULT_KEYWORDS: &[(&str, &[&str])] = &[
    ("Food", &["pizza", "burger", "restaurant", "coffee", "meal"]),
    ("Transport", &["uber", "taxi", "bus", "fuel", "train"]),
    ("Entertainment", &["netflix", "spotify", "cinema", "game"]),
    ("Shopping", &["amazon", "clothes", "mall", "shoes"]),
    ("Bills", &["rent", "electricity", "water", "internet"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionTier {
    History,
    ExistingCategory,
    DefaultKeywords,
}

impl fmt::Display for PredictionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PredictionTier::History => "history",
            PredictionTier::ExistingCategory => "existing category",
            PredictionTier::DefaultKeywords => "default keywords",
        };
        f.write_str(label)
    }
}

/// Outcome of a prediction. `NoSuggestion` is the normal "nothing confident"
/// result; callers leave the current category unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    Suggested {
        category: String,
        tier: PredictionTier,
    },
    NoSuggestion,
}

impl Prediction {
    pub fn category(&self) -> Option<&str> {
        match self {
            Prediction::Suggested { category, .. } => Some(category),
            Prediction::NoSuggestion => None,
        }
    }

    pub fn tier(&self) -> Option<PredictionTier> {
        match self {
            Prediction::Suggested { tier, .. } => Some(*tier),
            Prediction::NoSuggestion => None,
        }
    }

    pub fn into_category(self) -> Option<String> {
        match self {
            Prediction::Suggested { category, .. } => Some(category),
            Prediction::NoSuggestion => None,
        }
    }

    fn suggested(category: String, tier: PredictionTier) -> Self {
        Prediction::Suggested { category, tier }
    }
}

/// Predicts a category for `input` from the user's history and category names.
pub fn predict(input: Option<&str>, history: &[Transaction], categories: &[String]) -> Prediction {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Prediction::NoSuggestion;
    }
    let input_tokens: HashSet<&str> = tokens.iter().map(String::as_str).collect();

    if history.len() >= HISTORY_THRESHOLD {
        if let Some(category) = from_history(&input_tokens, history) {
            return Prediction::suggested(category, PredictionTier::History);
        }
    }

    if let Some(category) = from_existing_categories(&input_tokens, categories) {
        return Prediction::suggested(category, PredictionTier::ExistingCategory);
    }

    if let Some(category) = from_default_keywords(&input_tokens) {
        return Prediction::suggested(category, PredictionTier::DefaultKeywords);
    }

    Prediction::NoSuggestion
}

fn from_history(input: &HashSet<&str>, history: &[Transaction]) -> Option<String> {
    let mut scores = ScoreBoard::default();
    for txn in history {
        for token in tokenize_str(&txn.name) {
            if input.contains(token.as_str()) {
                scores.bump(&txn.category);
            }
        }
    }
    scores.winner()
}

fn from_existing_categories(input: &HashSet<&str>, categories: &[String]) -> Option<String> {
    categories
        .iter()
        .find(|name| {
            tokenize_str(name)
                .iter()
                .any(|token| input.contains(token.as_str()))
        })
        .cloned()
}

fn from_default_keywords(input: &HashSet<&str>) -> Option<String> {
    let mut scores = ScoreBoard::default();
    for (category, keywords) in DEFAULT_KEYWORDS {
        for keyword in keywords.iter() {
            if input.contains(keyword) {
                scores.bump(category);
            }
        }
    }
    scores.winner()
}

/// Per-category counters kept in first-seen order so ties resolve to the
/// earliest category.
#[derive(Default)]
struct ScoreBoard {
    entries: Vec<(String, usize)>,
}

impl ScoreBoard {
    fn bump(&mut self, category: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == category) {
            Some((_, score)) => *score += 1,
            None => self.entries.push((category.to_string(), 1)),
        }
    }

    fn winner(self) -> Option<String> {
        let mut best: Option<(String, usize)> = None;
        for (category, score) in self.entries {
            let leading = best.as_ref().map_or(0, |(_, top)| *top);
            if score > leading {
                best = Some((category, score));
            }
        }
        best.map(|(category, _)| category)
    }
}
