//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    csv_export::export_transactions_endpoint,
    csv_import::import_transactions,
    endpoints,
    not_found::get_404_not_found,
    summary::{get_current_summary_endpoint, get_monthly_summary_endpoint},
    transaction::{
        create_transaction_endpoint, delete_all_transactions_endpoint,
        delete_transaction_endpoint, edit_transaction_endpoint, get_transaction_endpoint,
        get_transactions_by_category_endpoint, get_transactions_endpoint,
        get_transactions_in_month_endpoint, search_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint)
                .post(create_transaction_endpoint)
                .delete(delete_all_transactions_endpoint),
        )
        .route(endpoints::SEARCH, get(search_transactions_endpoint))
        .route(endpoints::EXPORT, get(export_transactions_endpoint))
        .route(endpoints::IMPORT, post(import_transactions))
        .route(
            endpoints::TRANSACTIONS_BY_MONTH,
            get(get_transactions_in_month_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_BY_CATEGORY,
            get(get_transactions_by_category_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_current_summary_endpoint))
        .route(endpoints::MONTHLY_SUMMARY, get(get_monthly_summary_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
        transaction::Transaction,
    };

    #[tokio::test]
    async fn transaction_lifecycle() {
        let (server, _) = get_test_server();

        let created = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "title": "Coffee",
                "amount": 4.5,
                "date": "2024-03-05",
                "category": "Want"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let created = created.json::<Transaction>();
        let transaction_path = format_endpoint(endpoints::TRANSACTION, &created.id);

        let updated = server
            .put(&transaction_path)
            .json(&json!({ "notes": "Flat white" }))
            .await;
        updated.assert_status_ok();
        assert_eq!(
            updated.json::<Transaction>().notes.as_deref(),
            Some("Flat white")
        );

        server
            .delete(&transaction_path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.get(&transaction_path).await.assert_status_not_found();
        server
            .delete(&transaction_path)
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn fixed_routes_take_priority_over_transaction_ids() {
        let (server, _) = get_test_server();

        server.get(endpoints::EXPORT).await.assert_status_ok();
        server
            .get(endpoints::SEARCH)
            .add_query_param("q", "coffee")
            .await
            .assert_status_ok();
    }
}
