//! Exporting transactions as a CSV file.
//!
//! The export is a full backup: the ID and timestamps of every transaction
//! are included alongside the fields a user enters. Importing an export
//! creates new transactions with the same content.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, timezone::local_offset,
    transaction::{Transaction, get_all_transactions, timestamp},
};

/// The header line of an exported CSV file.
pub const EXPORT_HEADERS: [&str; 8] = [
    "ID",
    "Title",
    "Amount",
    "Date",
    "Category",
    "Notes",
    "Created At",
    "Updated At",
];

/// Write `transactions` as CSV text, one line per transaction after the header.
///
/// Titles and notes are always quoted since they are free text.
pub fn export_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));

    for transaction in transactions {
        let fields = [
            transaction.id.to_string(),
            quote(&transaction.title),
            transaction.amount.to_string(),
            transaction.date.to_string(),
            transaction.category.to_string(),
            quote(transaction.notes.as_deref().unwrap_or_default()),
            timestamp::format(transaction.created_at),
            timestamp::format(transaction.updated_at),
        ];

        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// The name of the file to save an export made on `date` to.
pub fn export_file_name(date: Date) -> String {
    format!("transactions-{date}.csv")
}

/// The state needed for exporting transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for downloading every transaction as a CSV file.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    let transactions = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_all_transactions(&connection)?
    };

    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let file_name = export_file_name(today);

    tracing::info!(
        "Exporting {} transactions to {file_name}",
        transactions.len()
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        export_csv(&transactions),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Category,
        csv_export::{EXPORT_HEADERS, export_csv, export_file_name},
        endpoints,
        test_utils::{assert_content_type, get_header, get_test_server, new_transaction},
        transaction::{Transaction, TransactionId, create_transaction, timestamp},
    };

    fn transaction(title: &str, amount: f64, notes: Option<&str>) -> Transaction {
        let now = timestamp::now();

        Transaction {
            id: TransactionId::new(),
            title: title.to_owned(),
            amount,
            date: date!(2024 - 03 - 05),
            category: Category::Need,
            notes: notes.map(str::to_owned),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_export_is_only_the_header() {
        assert_eq!(
            export_csv(&[]),
            "ID,Title,Amount,Date,Category,Notes,Created At,Updated At"
        );
    }

    #[test]
    fn writes_one_line_per_transaction() {
        let transaction = transaction("Groceries", 100.0, None);

        let csv = export_csv(std::slice::from_ref(&transaction));

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            format!(
                "{},\"Groceries\",100,2024-03-05,Need,\"\",{},{}",
                transaction.id,
                timestamp::format(transaction.created_at),
                timestamp::format(transaction.updated_at)
            )
        );
    }

    #[test]
    fn export_is_valid_csv_with_quotes_and_commas() {
        let transactions = [
            transaction("Grocery, weekly", 12.5, Some("said \"hi\"")),
            transaction("Plain", 3.0, None),
        ];

        let csv = export_csv(&transactions);

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(headers, EXPORT_HEADERS);

        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "Grocery, weekly");
        assert_eq!(&records[0][2], "12.5");
        assert_eq!(&records[0][5], "said \"hi\"");
        assert_eq!(&records[1][5], "");
    }

    #[test]
    fn file_name_includes_date() {
        assert_eq!(
            export_file_name(date!(2024 - 03 - 05)),
            "transactions-2024-03-05.csv"
        );
    }

    #[tokio::test]
    async fn export_endpoint_downloads_csv() {
        let (server, state) = get_test_server();
        create_transaction(
            new_transaction("Rent", 1200.0, date!(2024 - 03 - 01), Category::Need),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server.get(endpoints::EXPORT).await;

        response.assert_status_ok();
        assert_content_type(&response, "text/csv; charset=utf-8");
        let today = OffsetDateTime::now_utc().date();
        assert_eq!(
            get_header(&response, "content-disposition"),
            format!("attachment; filename=\"transactions-{today}.csv\"")
        );
        let text = response.text();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"Rent\",1200,2024-03-01,Need"));
    }
}
