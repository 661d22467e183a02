//! Database queries for listing, filtering and searching transactions.
//!
//! Every query returns transactions newest first. Transactions on the same
//! date are ordered by when they were recorded, newest first.

use rusqlite::{Connection, Params};

use crate::{
    Category, Error, YearMonth,
    transaction::{
        Transaction,
        core::{SELECT_TRANSACTIONS, map_transaction_row},
    },
};

const ORDER_NEWEST_FIRST: &str = "ORDER BY date DESC, created_at DESC";

/// Get every transaction.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    query_transactions("", [], connection)
}

/// Get the transactions dated within `month`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions_in_month(
    month: YearMonth,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions(
        "WHERE date BETWEEN ?1 AND ?2",
        (month.first_day(), month.last_day()),
        connection,
    )
}

/// Get the transactions in `category`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions_by_category(
    category: Category,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    query_transactions("WHERE category = ?1", [category], connection)
}

/// Get the transactions whose title, notes or category contain `query`,
/// ignoring case, optionally limited to `category`.
///
/// `query` is matched as given, including any surrounding whitespace.
///
/// # Errors
/// Returns:
/// - [Error::EmptySearchQuery] if `query` is empty or only whitespace,
/// - or [Error::SqlError] if the query fails.
pub fn search_transactions(
    query: &str,
    category: Option<Category>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if query.trim().is_empty() {
        return Err(Error::EmptySearchQuery);
    }

    // SQLite's LIKE only folds ASCII, so matching is done here.
    let needle = query.to_lowercase();

    let candidates = match category {
        Some(category) => get_transactions_by_category(category, connection)?,
        None => get_all_transactions(connection)?,
    };

    let transactions = candidates
        .into_iter()
        .filter(|transaction| matches_search(transaction, &needle))
        .collect();

    Ok(transactions)
}

fn matches_search(transaction: &Transaction, needle: &str) -> bool {
    transaction.title.to_lowercase().contains(needle)
        || transaction
            .notes
            .as_ref()
            .is_some_and(|notes| notes.to_lowercase().contains(needle))
        || transaction
            .category
            .as_str()
            .to_lowercase()
            .contains(needle)
}

fn query_transactions<P: Params>(
    where_clause: &str,
    params: P,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let query = format!("{SELECT_TRANSACTIONS} {where_clause} {ORDER_NEWEST_FIRST}");

    connection
        .prepare(&query)?
        .query_map(params, map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}
