//! Importing transactions from CSV files.

mod csv;
mod import_transactions;

pub use self::csv::{ParseCSVResult, SkippedRow, parse_csv};
pub use import_transactions::import_transactions;
