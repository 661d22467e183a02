//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated types it is built from
//! - Database functions for storing, querying and searching transactions
//! - The JSON endpoints for managing transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;
mod query;
mod state;
pub(crate) mod timestamp;

pub use self::core::{
    Amount, NewTransaction, Title, Transaction, TransactionId, TransactionUpdate,
    create_transaction, create_transaction_table, delete_all_transactions, delete_transaction,
    get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{delete_all_transactions_endpoint, delete_transaction_endpoint};
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::{TransactionForm, TransactionPatch};
pub use list_endpoint::{
    get_transaction_endpoint, get_transactions_by_category_endpoint,
    get_transactions_endpoint, get_transactions_in_month_endpoint, search_transactions_endpoint,
};
pub use query::{
    get_all_transactions, get_transactions_by_category, get_transactions_in_month,
    search_transactions,
};
pub use state::TransactionState;

#[cfg(test)]
pub use self::core::{count_transactions, insert_transaction};
