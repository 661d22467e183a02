//! The endpoint for importing transactions from uploaded CSV files.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    csv_import::csv::{SkippedRow, parse_csv},
    transaction::{NewTransaction, create_transaction},
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The outcome of an import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// How many transactions were stored.
    pub imported: usize,
    /// The rows that were not imported and why.
    pub skipped: Vec<SkippedRow>,
}

/// Route handler for importing transactions from CSV files.
///
/// Every part of the multipart form must be a `text/csv` file. Invalid rows
/// are skipped, the valid rows from all files are stored together: either
/// all of them are stored or none are.
pub async fn import_transactions(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImportSummary>), Error> {
    let start_time = std::time::Instant::now();
    let mut transactions = Vec::new();
    let mut skipped = Vec::new();
    let mut file_count = 0;

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        tracing::error!("Could not read multipart form: {error}");
        Error::MultipartError(error.body_text())
    })? {
        let (file_name, csv_data) = parse_multipart_field(field).await?;

        let parse_result = parse_csv(&csv_data)
            .inspect_err(|error| tracing::debug!("Failed to parse CSV '{file_name}': {error}"))?;

        transactions.extend(parse_result.transactions);
        skipped.extend(parse_result.skipped.into_iter().map(|row| SkippedRow {
            file_name: Some(file_name.clone()),
            ..row
        }));
        file_count += 1;
    }

    if file_count == 0 {
        return Err(Error::MultipartError("No CSV files were uploaded".to_owned()));
    }

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let tx = connection
        .unchecked_transaction()
        .inspect_err(|error| tracing::error!("could not start transaction: {error}"))?;

    let imported = import_transaction_list(transactions, &tx)
        .inspect_err(|error| tracing::error!("Failed to import transactions: {error}"))?;

    tx.commit()?;

    tracing::info!(
        "Imported {imported} transactions from {file_count} files in {}ms, skipped {} rows",
        start_time.elapsed().as_millis(),
        skipped.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(ImportSummary { imported, skipped }),
    ))
}

/// Get the file name and text of an uploaded CSV file.
async fn parse_multipart_field(field: Field<'_>) -> Result<(String, String), Error> {
    if !field
        .content_type()
        .is_some_and(|content_type| content_type.starts_with("text/csv"))
    {
        return Err(Error::NotCSV);
    }

    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };
    let data = match field.text().await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok((file_name, data))
}

/// Store many transactions, each with a new ID.
///
/// **Note**: If you want transactional integrity (all or nothing), pass in a
/// transaction for `connection`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
fn import_transaction_list(
    transactions: Vec<NewTransaction>,
    connection: &Connection,
) -> Result<usize, Error> {
    let count = transactions.len();

    for transaction in transactions {
        create_transaction(transaction, connection)?;
    }

    Ok(count)
}
