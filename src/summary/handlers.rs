//! Route handlers for the monthly summary.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, YearMonth, summary::MonthlySummary, timezone::local_offset,
    transaction::get_transactions_in_month,
};

/// The state needed to summarize transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for the summary of the current month in the local timezone.
pub async fn get_current_summary_endpoint(
    State(state): State<SummaryState>,
) -> Result<Json<MonthlySummary>, Error> {
    let local_offset = local_offset(&state.local_timezone)?;

    summarize_month(YearMonth::current(local_offset), &state).map(Json)
}

/// A route handler for the summary of a month given as `YYYY-MM`.
///
/// Responds with 400 if the month is malformed.
pub async fn get_monthly_summary_endpoint(
    State(state): State<SummaryState>,
    Path(month): Path<String>,
) -> Result<Json<MonthlySummary>, Error> {
    let month: YearMonth = month.parse()?;

    summarize_month(month, &state).map(Json)
}

fn summarize_month(month: YearMonth, state: &SummaryState) -> Result<MonthlySummary, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = get_transactions_in_month(month, &connection)?;

    Ok(MonthlySummary::new(month, &transactions))
}
