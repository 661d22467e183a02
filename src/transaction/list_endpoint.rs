//! Endpoints for reading transactions: all, one, by month, by category and search.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    Category, Error, YearMonth,
    transaction::{
        Transaction, TransactionId, TransactionState, get_all_transactions, get_transaction,
        get_transactions_by_category, get_transactions_in_month, search_transactions,
    },
};

/// The query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Only list transactions in this category.
    pub category: Option<String>,
}

/// A route handler for listing every transaction, newest first.
///
/// Responds with 400 if the optional `category` is not one of the fixed
/// categories.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let category = parse_category(params.category)?;
    let connection = state.connection()?;

    match category {
        Some(category) => get_transactions_by_category(category, &connection).map(Json),
        None => get_all_transactions(&connection).map(Json),
    }
}

/// A route handler for getting a single transaction by its ID.
///
/// Responds with 404 if no transaction has the ID.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.connection()?;

    get_transaction(&transaction_id, &connection).map(Json)
}

/// A route handler for listing the transactions in a month given as `YYYY-MM`.
///
/// Responds with 400 if the month is malformed.
pub async fn get_transactions_in_month_endpoint(
    State(state): State<TransactionState>,
    Path(month): Path<String>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let month: YearMonth = month.parse()?;
    let connection = state.connection()?;

    get_transactions_in_month(month, &connection).map(Json)
}

/// A route handler for listing the transactions in a category.
///
/// Responds with 400 if the category is not one of the fixed categories.
pub async fn get_transactions_by_category_endpoint(
    State(state): State<TransactionState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let category: Category = category.parse()?;
    let connection = state.connection()?;

    get_transactions_by_category(category, &connection).map(Json)
}

/// The query parameters for searching transactions.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// The text to search for.
    pub q: Option<String>,
    /// Only search transactions in this category.
    pub category: Option<String>,
}

/// A route handler for searching transaction titles, notes and categories.
///
/// Responds with 400 if the search text is missing or blank, or if the
/// optional `category` is not one of the fixed categories.
pub async fn search_transactions_endpoint(
    State(state): State<TransactionState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let query = params.q.ok_or(Error::EmptySearchQuery)?;
    let category = parse_category(params.category)?;
    let connection = state.connection()?;

    search_transactions(&query, category, &connection).map(Json)
}

fn parse_category(category: Option<String>) -> Result<Option<Category>, Error> {
    category.map(|category| category.parse::<Category>()).transpose()
}
