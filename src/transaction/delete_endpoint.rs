//! Defines the endpoints for deleting one or all transactions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    transaction::{TransactionId, TransactionState, delete_all_transactions, delete_transaction},
};

/// A route handler for deleting a transaction.
///
/// Responds with 204 on success or 404 if no transaction has the ID.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state.connection()?;

    delete_transaction(&transaction_id, &connection)
        .inspect_err(|error| tracing::debug!("Could not delete transaction {transaction_id}: {error}"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for deleting every transaction.
pub async fn delete_all_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<StatusCode, Error> {
    let connection = state.connection()?;

    let deleted = delete_all_transactions(&connection)?;
    tracing::info!("Deleted all {deleted} transactions");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::date;

    use crate::{
        Category, Error,
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, new_transaction},
        transaction::{count_transactions, create_transaction, get_transaction},
    };

    #[tokio::test]
    async fn deletes_transaction() {
        let (server, state) = get_test_server();
        let transaction = create_transaction(
            new_transaction("Rent", 1200.0, date!(2024 - 03 - 01), Category::Need),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, &transaction.id))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(&transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_unknown_transaction_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, "missing"))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn deletes_all_transactions() {
        let (server, state) = get_test_server();
        {
            let connection = state.db_connection.lock().unwrap();
            for title in ["One", "Two", "Three"] {
                create_transaction(
                    new_transaction(title, 5.0, date!(2024 - 03 - 01), Category::Want),
                    &connection,
                )
                .unwrap();
            }
        }

        let response = server.delete(endpoints::TRANSACTIONS).await;

        response.assert_status(StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(0));
    }
}
