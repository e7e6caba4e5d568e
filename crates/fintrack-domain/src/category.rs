//! Category records as stored remotely.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Name of the category bootstrapped into every empty category set.
pub const DEFAULT_CATEGORY: &str = "Other";

/// A user-defined category. Transactions reference categories by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
}

impl CategoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_CATEGORY
    }
}

impl NamedEntity for CategoryRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for CategoryRecord {
    fn display_label(&self) -> String {
        if self.is_default() {
            format!("{} (default)", self.name)
        } else {
            self.name.clone()
        }
    }
}
