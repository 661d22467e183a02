//! Aggregation of transactions into per-category totals and monthly summaries.

use serde::{Deserialize, Serialize};

use crate::{Category, YearMonth, transaction::Transaction};

/// How many of the latest transactions a [MonthlySummary] includes.
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The total amount and number of transactions in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The category being summarized.
    pub category: Category,
    /// The sum of the amounts in the category.
    pub total: f64,
    /// The number of transactions in the category.
    pub count: usize,
}

/// Sum the amounts and count the transactions in each category.
///
/// The result has exactly one entry per category, in the order of
/// [Category::ALL]. Categories with no transactions have a zero total and count.
pub fn summarize_by_category(transactions: &[Transaction]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Category::ALL
        .into_iter()
        .map(|category| CategorySummary {
            category,
            total: 0.0,
            count: 0,
        })
        .collect();

    for transaction in transactions {
        if let Some(summary) = summaries
            .iter_mut()
            .find(|summary| summary.category == transaction.category)
        {
            summary.total += transaction.amount;
            summary.count += 1;
        }
    }

    summaries
}

/// The signed sum of `transactions`.
///
/// Savings add to the balance, every other category subtracts from it.
pub fn net_balance(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| {
            if transaction.category.is_credit() {
                transaction.amount
            } else {
                -transaction.amount
            }
        })
        .sum()
}

/// An overview of the transactions in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// The month being summarized.
    pub month: YearMonth,
    /// The net balance of the month, see [net_balance].
    pub net_balance: f64,
    /// The totals for each category, see [summarize_by_category].
    pub categories: Vec<CategorySummary>,
    /// The number of transactions in the month.
    pub total_transactions: usize,
    /// The latest transactions in the month, newest first.
    pub recent_transactions: Vec<Transaction>,
    /// The month before, for navigation. `None` before `0000-01`.
    pub previous_month: Option<YearMonth>,
    /// The month after, for navigation. `None` after `9999-12`.
    pub next_month: Option<YearMonth>,
}

impl MonthlySummary {
    /// Summarize the transactions that fall in `month`.
    ///
    /// Transactions outside of `month` are ignored.
    pub fn new(month: YearMonth, transactions: &[Transaction]) -> Self {
        let mut in_month: Vec<Transaction> = transactions
            .iter()
            .filter(|transaction| month.contains(transaction.date))
            .cloned()
            .collect();

        in_month.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Self {
            month,
            net_balance: net_balance(&in_month),
            categories: summarize_by_category(&in_month),
            total_transactions: in_month.len(),
            recent_transactions: in_month
                .iter()
                .take(RECENT_TRANSACTION_COUNT)
                .cloned()
                .collect(),
            previous_month: month.previous(),
            next_month: month.next(),
        }
    }
}
