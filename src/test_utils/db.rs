use axum_test::TestServer;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Category, build_router, db::initialize,
    transaction::{Amount, NewTransaction, Title},
};

pub(crate) fn get_test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}

pub(crate) fn get_test_state() -> AppState {
    let conn = Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(conn, "Etc/UTC").expect("Could not create app state.")
}

/// Create a test server over the full router, returning the state so that
/// tests can inspect the database directly.
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_state();
    let app = build_router(state.clone());
    let server = TestServer::try_new(app).expect("Could not create test server.");

    (server, state)
}

#[track_caller]
pub(crate) fn new_transaction(
    title: &str,
    amount: f64,
    date: Date,
    category: Category,
) -> NewTransaction {
    NewTransaction::new(
        Title::new(title).expect("invalid test title"),
        Amount::new(amount).expect("invalid test amount"),
        date,
        category,
    )
}
