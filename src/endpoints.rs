//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The route to list and create transactions, and to clear all transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list the transactions in a month, e.g. '/api/transactions/month/2024-03'.
pub const TRANSACTIONS_BY_MONTH: &str = "/api/transactions/month/{month}";
/// The route to list the transactions in a category, e.g. '/api/transactions/category/Saving'.
pub const TRANSACTIONS_BY_CATEGORY: &str = "/api/transactions/category/{category}";
/// The route to search transactions with the query parameter `q`.
pub const SEARCH: &str = "/api/transactions/search";
/// The route to download all transactions as a CSV file.
pub const EXPORT: &str = "/api/transactions/export";
/// The route to upload CSV files for importing transactions.
pub const IMPORT: &str = "/api/transactions/import";
/// The route for the summary of the current month.
pub const SUMMARY: &str = "/api/summary";
/// The route for the summary of a given month, e.g. '/api/summary/2024-03'.
pub const MONTHLY_SUMMARY: &str = "/api/summary/{month}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/transactions/{transaction_id}', '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let param_start = match endpoint_path.find('{') {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
