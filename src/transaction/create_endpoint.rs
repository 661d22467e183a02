//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    transaction::{
        Transaction, TransactionForm, TransactionState, create_transaction, form::parse_json_body,
    },
};

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction, or 400 with the validation
/// errors if the body is invalid.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    payload: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = parse_json_body(payload)?.validate()?;

    let connection = state.connection()?;
    let transaction = create_transaction(new_transaction, &connection)?;

    tracing::debug!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}
