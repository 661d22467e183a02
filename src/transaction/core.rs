//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

use crate::{Category, Error, transaction::timestamp};

// ============================================================================
// MODELS
// ============================================================================

/// The unique, immutable identifier of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(TransactionId::from)
    }
}

/// A validated, non-empty transaction title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyTitle] if `title` is empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTitle)
        } else {
            Ok(Self(title.to_owned()))
        }
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated transaction amount.
///
/// Amounts are always positive, the [Category] decides whether money came in
/// or went out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount(f64);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidAmount] if `amount` is zero,
    /// negative, infinite or NaN.
    pub fn new(amount: f64) -> Result<Self, Error> {
        if amount.is_finite() && amount > 0.0 {
            Ok(Self(amount))
        } else {
            Err(Error::InvalidAmount(amount))
        }
    }

    /// The amount as a number.
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// A record of money saved, spent or owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short description of what the transaction was for.
    pub title: String,
    /// The amount of money, always positive.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// How the transaction is classified.
    pub category: Category,
    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the transaction was first recorded.
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
}

/// The validated fields needed to record a new transaction.
///
/// The ID and timestamps are assigned when the transaction is stored, see
/// [create_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short description of what the transaction was for.
    pub title: Title,
    /// The amount of money.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// How the transaction is classified.
    pub category: Category,
    /// Optional free text, `None` rather than an empty string.
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Create a new transaction without notes.
    pub fn new(title: Title, amount: Amount, date: Date, category: Category) -> Self {
        Self {
            title,
            amount,
            date,
            category,
            notes: None,
        }
    }

    /// Set the notes for the transaction. Blank notes are stored as `None`.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = normalize_notes(notes);
        self
    }
}

/// A validated set of changes to apply to a stored transaction.
///
/// Fields set to `None` are left unchanged. For `notes`, `Some(None)` clears
/// the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// The new title.
    pub title: Option<Title>,
    /// The new amount.
    pub amount: Option<Amount>,
    /// The new date.
    pub date: Option<Date>,
    /// The new category.
    pub category: Option<Category>,
    /// The new notes.
    pub notes: Option<Option<String>>,
}

impl TransactionUpdate {
    /// Merge the changes into `transaction`, setting its `updated_at` to `now`.
    ///
    /// The ID and creation time are never changed.
    pub fn apply(self, mut transaction: Transaction, now: OffsetDateTime) -> Transaction {
        if let Some(title) = self.title {
            transaction.title = title.0;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount.value();
        }

        if let Some(date) = self.date {
            transaction.date = date;
        }

        if let Some(category) = self.category {
            transaction.category = category;
        }

        if let Some(notes) = self.notes {
            transaction.notes = normalize_notes(notes);
        }

        transaction.updated_at = now;
        transaction
    }
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a calendar date in the format `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns an [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let text = text.trim();

    Date::parse(text, DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|notes| !notes.trim().is_empty())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(super) const SELECT_TRANSACTIONS: &str = "SELECT id, title, amount, date, category, notes, created_at, updated_at FROM \"transaction\"";

/// Store a new transaction with a fresh ID and the current time as its
/// creation and update time.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = timestamp::now();
    let transaction = Transaction {
        id: TransactionId::new(),
        title: new_transaction.title.0,
        amount: new_transaction.amount.value(),
        date: new_transaction.date,
        category: new_transaction.category,
        notes: normalize_notes(new_transaction.notes),
        created_at: now,
        updated_at: now,
    };

    insert_transaction(&transaction, connection)?;

    Ok(transaction)
}

/// Store a complete transaction record as is.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateTransactionId] if a transaction with the same ID is already stored,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn insert_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO \"transaction\" (id, title, amount, date, category, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                &transaction.id,
                &transaction.title,
                transaction.amount,
                transaction.date,
                transaction.category,
                &transaction.notes,
                timestamp::format(transaction.created_at),
                timestamp::format(transaction.updated_at),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code:
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateTransactionId,
            error => error.into(),
        })?;

    Ok(())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: &TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTIONS} WHERE id = :id"))?
        .query_one(&[(":id", id)], map_transaction_row)?;

    Ok(transaction)
}

/// Merge `update` into the transaction with `id` and return the stored result.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: &TransactionId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    let updated = update.apply(existing, timestamp::now());

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET title = ?1, amount = ?2, date = ?3, category = ?4, notes = ?5, updated_at = ?6
         WHERE id = ?7",
        (
            &updated.title,
            updated.amount,
            updated.date,
            updated.category,
            &updated.notes,
            timestamp::format(updated.updated_at),
            &updated.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(updated)
}

/// Delete the transaction with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a stored transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: &TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Delete every transaction, returning how many were removed.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\"", [])
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// The indexes on date, category and title back the month, category and
/// title lookups.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL CHECK (length(title) > 0),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            category TEXT NOT NULL
                CHECK (category IN ('Saving', 'Expense', 'Debt', 'Need', 'Want')),
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category);
        CREATE INDEX IF NOT EXISTS idx_transaction_title ON \"transaction\"(title);",
    )
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `SELECT_TRANSACTIONS`.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let date = row.get(3)?;
    let category = row.get(4)?;
    let notes = row.get(5)?;
    let created_at = get_timestamp(row, 6)?;
    let updated_at = get_timestamp(row, 7)?;

    Ok(Transaction {
        id,
        title,
        amount,
        date,
        category,
        notes,
        created_at,
        updated_at,
    })
}

fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    timestamp::parse(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use time::macros::{date, datetime};

    use crate::{
        Category, Error,
        transaction::{
            Amount, Title, Transaction, TransactionId, TransactionUpdate, core::parse_date,
        },
    };

    #[test]
    fn title_fails_on_empty_string() {
        assert_eq!(Title::new(""), Err(Error::EmptyTitle));
    }

    #[test]
    fn title_fails_on_just_whitespace() {
        assert_eq!(Title::new("\n\t \r"), Err(Error::EmptyTitle));
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(Title::new("  Rent ").unwrap().as_ref(), "Rent");
    }

    #[test]
    fn amount_must_be_positive_and_finite() {
        for amount in [0.0, -0.01, -100.0, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(Amount::new(amount), Err(Error::InvalidAmount(amount)));
        }

        assert!(matches!(Amount::new(f64::NAN), Err(Error::InvalidAmount(_))));
        assert_eq!(Amount::new(0.01).unwrap().value(), 0.01);
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-03-05"), Ok(date!(2024 - 03 - 05)));
        assert_eq!(parse_date(" 2024-03-05 "), Ok(date!(2024 - 03 - 05)));
    }

    #[test]
    fn rejects_invalid_dates() {
        for text in ["2024-02-30", "05/03/2024", "2024-3-5", ""] {
            assert_eq!(parse_date(text), Err(Error::InvalidDate(text.to_owned())));
        }
    }

    fn stored_transaction() -> Transaction {
        Transaction {
            id: TransactionId::from("abc"),
            title: "Rent".to_owned(),
            amount: 400.0,
            date: date!(2024 - 03 - 01),
            category: Category::Need,
            notes: Some("March".to_owned()),
            created_at: datetime!(2024 - 03 - 01 09:00 UTC),
            updated_at: datetime!(2024 - 03 - 01 09:00 UTC),
        }
    }

    #[test]
    fn update_merges_only_given_fields() {
        let now = datetime!(2024 - 03 - 02 10:30 UTC);
        let update = TransactionUpdate {
            amount: Some(Amount::new(450.0).unwrap()),
            ..Default::default()
        };

        let updated = update.apply(stored_transaction(), now);

        assert_eq!(
            updated,
            Transaction {
                amount: 450.0,
                updated_at: now,
                ..stored_transaction()
            }
        );
    }

    #[test]
    fn update_can_clear_notes() {
        let now = datetime!(2024 - 03 - 02 10:30 UTC);
        let update = TransactionUpdate {
            notes: Some(None),
            ..Default::default()
        };

        let updated = update.apply(stored_transaction(), now);

        assert_eq!(updated.notes, None);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(stored_transaction()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "abc",
                "title": "Rent",
                "amount": 400.0,
                "date": "2024-03-01",
                "category": "Need",
                "notes": "March",
                "createdAt": "2024-03-01T09:00:00.000Z",
                "updatedAt": "2024-03-01T09:00:00.000Z"
            })
        );
    }
}
