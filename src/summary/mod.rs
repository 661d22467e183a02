//! Summaries of transactions: totals per category, net balance and the
//! monthly overview.

mod aggregation;
mod handlers;

pub use aggregation::{CategorySummary, MonthlySummary, net_balance, summarize_by_category};
pub use handlers::{SummaryState, get_current_summary_endpoint, get_monthly_summary_endpoint};
