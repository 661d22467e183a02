//! Defines the endpoint for editing a transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use crate::{
    Error,
    transaction::{
        Transaction, TransactionId, TransactionPatch, TransactionState, form::parse_json_body,
        update_transaction,
    },
};

/// A route handler for editing a transaction.
///
/// Only the fields present in the body are changed. Responds with the updated
/// transaction, 400 if a given field is invalid, or 404 if no transaction has
/// the ID.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let update = parse_json_body(payload)?.validate()?;

    let connection = state.connection()?;
    let transaction = update_transaction(&transaction_id, update, &connection)
        .inspect_err(|error| tracing::debug!("Could not update transaction {transaction_id}: {error}"))?;

    Ok(Json(transaction))
}
