//! The fixed set of categories a transaction can belong to.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// How a transaction is classified.
///
/// The category decides which summary a transaction is grouped under and
/// whether it adds to or subtracts from the net balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Money put aside. The only category counted as a credit.
    Saving,
    /// General spending.
    Expense,
    /// Repayments on money owed.
    Debt,
    /// Essential spending, e.g. rent or groceries.
    Need,
    /// Discretionary spending.
    Want,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Saving,
        Category::Expense,
        Category::Debt,
        Category::Need,
        Category::Want,
    ];

    /// The name of the category as shown to users and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Saving => "Saving",
            Category::Expense => "Expense",
            Category::Debt => "Debt",
            Category::Need => "Need",
            Category::Want => "Want",
        }
    }

    /// Whether transactions in this category add to the net balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, Category::Saving)
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category from its exact name, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidCategory] if `s` does not name a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == name)
            .ok_or_else(|| Error::InvalidCategory(name.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}
