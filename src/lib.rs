//! Finance Tracker is a web app for recording personal transactions and
//! reviewing where the money went each month.
//!
//! This library provides a JSON REST API backed by a SQLite database:
//! transactions can be created, edited, deleted, filtered by month or
//! category, searched, summarised per category and moved in and out of the
//! app as CSV files.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod category;
mod csv_export;
mod csv_import;
mod db;
pub mod endpoints;
mod logging;
mod month;
mod not_found;
mod routing;
mod summary;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::Category;
pub use csv_export::{EXPORT_HEADERS, export_csv, export_file_name};
pub use csv_import::{ParseCSVResult, SkippedRow, parse_csv};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use month::YearMonth;
pub use routing::build_router;
pub use summary::{CategorySummary, MonthlySummary, net_balance, summarize_by_category};
pub use timezone::get_local_offset;
pub use transaction::{
    Amount, NewTransaction, Title, Transaction, TransactionForm, TransactionId, create_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as a transaction title.
    #[error("title is required")]
    EmptyTitle,

    /// A transaction amount was zero, negative or not a finite number.
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// The text does not name one of the fixed categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The text could not be parsed as a calendar date in the format `YYYY-MM-DD`.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The text could not be parsed as a month in the format `YYYY-MM`.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// A transaction failed validation at the input boundary.
    ///
    /// Holds one message per invalid field.
    #[error("invalid transaction: {}", .0.join(", "))]
    InvalidTransaction(Vec<String>),

    /// A search was requested without any search text.
    #[error("search query is required")]
    EmptySearchQuery,

    /// The multipart form could not be parsed as a list of CSV files.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("File is not a CSV")]
    NotCSV,

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the transaction has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction with the same ID is already stored.
    #[error("a transaction with the same ID already exists")]
    DuplicateTransactionId,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Error::DuplicateTransactionId
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl ErrorBody {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            errors: Vec::new(),
        }
    }
}

pub(crate) fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTransaction(errors) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Invalid data".to_owned(),
                    errors,
                },
            ),
            error @ (Error::EmptyTitle | Error::InvalidAmount(_) | Error::InvalidDate(_)) => {
                error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        message: "Invalid data".to_owned(),
                        errors: vec![error.to_string()],
                    },
                )
            }
            Error::InvalidCategory(_) => {
                error_response(StatusCode::BAD_REQUEST, ErrorBody::new("Invalid category"))
            }
            Error::InvalidMonth(month) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody::new(&format!("Invalid month \"{month}\", expected YYYY-MM")),
            ),
            Error::EmptySearchQuery => error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Search query is required"),
            ),
            Error::NotCSV => {
                error_response(StatusCode::BAD_REQUEST, ErrorBody::new("File type must be CSV."))
            }
            Error::InvalidCSV(reason) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Failed to parse CSV".to_owned(),
                    errors: vec![reason],
                },
            ),
            Error::MultipartError(reason) => error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Could not read the uploaded files".to_owned(),
                    errors: vec![reason],
                },
            ),
            Error::NotFound | Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                error_response(StatusCode::NOT_FOUND, ErrorBody::new("Transaction not found"))
            }
            Error::DuplicateTransactionId => error_response(
                StatusCode::CONFLICT,
                ErrorBody::new("A transaction with this ID already exists"),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Something went wrong, check the server logs for more details."),
                )
            }
        }
    }
}
