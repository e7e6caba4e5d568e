//! Aggregated totals over a ledger snapshot.

use fintrack_domain::{Transaction, TransactionKind};

/// Expense total for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: usize,
}

/// Headline figures for a set of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    /// Savings as a percentage of income, rounded to one decimal; zero
    /// without income.
    pub savings_ratio: f64,
    pub highest_spending_category: Option<CategoryTotal>,
    pub transaction_count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(transactions: &[Transaction]) -> LedgerSummary {
        let mut total_income = 0.0;
        let mut total_expenses = 0.0;
        for txn in transactions {
            match txn.kind {
                TransactionKind::Income => total_income += txn.amount,
                TransactionKind::Expense => total_expenses += txn.amount,
            }
        }

        let savings = total_income - total_expenses;
        let savings_ratio = if total_income > 0.0 {
            (savings / total_income * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let mut highest: Option<CategoryTotal> = None;
        for total in Self::totals_by_category(transactions) {
            let leading = highest.as_ref().map_or(0.0, |best| best.amount);
            if total.amount > leading {
                highest = Some(total);
            }
        }

        LedgerSummary {
            total_income,
            total_expenses,
            savings,
            savings_ratio,
            highest_spending_category: highest,
            transaction_count: transactions.len(),
        }
    }

    /// Expense totals per category in first-seen order.
    pub fn totals_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for txn in transactions
            .iter()
            .filter(|txn| txn.kind == TransactionKind::Expense)
        {
            match totals.iter_mut().find(|total| total.category == txn.category) {
                Some(total) => {
                    total.amount += txn.amount;
                    total.count += 1;
                }
                None => totals.push(CategoryTotal {
                    category: txn.category.clone(),
                    amount: txn.amount,
                    count: 1,
                }),
            }
        }
        totals
    }

    /// Transactions referencing `category`, in snapshot order.
    pub fn in_category<'a>(transactions: &'a [Transaction], category: &str) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|txn| txn.category == category)
            .collect()
    }
}
