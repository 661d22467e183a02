//! Raw transaction input from clients and its validation.
//!
//! Input is validated here, at the boundary, so that only well-formed
//! transactions reach the database.

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use crate::{
    Category, Error,
    transaction::{Amount, NewTransaction, Title, TransactionUpdate, core::parse_date},
};

/// The JSON body for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// A short description of the transaction.
    pub title: String,
    /// The amount of money, must be positive.
    pub amount: f64,
    /// The date in the format `YYYY-MM-DD`.
    pub date: String,
    /// The name of one of the fixed categories.
    pub category: String,
    /// Optional free text.
    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionForm {
    /// Check every field and convert the form into a [NewTransaction].
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTransaction] with one message per invalid field.
    pub fn validate(self) -> Result<NewTransaction, Error> {
        let mut errors = Vec::new();

        let title = collect_error(Title::new(&self.title), &mut errors);
        let amount = collect_error(Amount::new(self.amount), &mut errors);
        let date = collect_error(parse_date(&self.date), &mut errors);
        let category = collect_error(self.category.parse::<Category>(), &mut errors);

        match (title, amount, date, category) {
            (Some(title), Some(amount), Some(date), Some(category)) if errors.is_empty() => {
                Ok(NewTransaction::new(title, amount, date, category).notes(self.notes))
            }
            _ => Err(Error::InvalidTransaction(errors)),
        }
    }
}

/// The JSON body for editing a transaction. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionPatch {
    /// A new title.
    pub title: Option<String>,
    /// A new amount, must be positive.
    pub amount: Option<f64>,
    /// A new date in the format `YYYY-MM-DD`.
    pub date: Option<String>,
    /// A new category name.
    pub category: Option<String>,
    /// New notes, an empty string clears the notes.
    pub notes: Option<String>,
}

impl TransactionPatch {
    /// Check the given fields and convert the patch into a [TransactionUpdate].
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTransaction] with one message per invalid field.
    pub fn validate(self) -> Result<TransactionUpdate, Error> {
        let mut errors = Vec::new();

        let update = TransactionUpdate {
            title: self
                .title
                .and_then(|title| collect_error(Title::new(&title), &mut errors)),
            amount: self
                .amount
                .and_then(|amount| collect_error(Amount::new(amount), &mut errors)),
            date: self
                .date
                .and_then(|date| collect_error(parse_date(&date), &mut errors)),
            category: self
                .category
                .and_then(|category| collect_error(category.parse(), &mut errors)),
            notes: self.notes.map(Some),
        };

        if errors.is_empty() {
            Ok(update)
        } else {
            Err(Error::InvalidTransaction(errors))
        }
    }
}

fn collect_error<T>(result: Result<T, Error>, errors: &mut Vec<String>) -> Option<T> {
    result.map_err(|error| errors.push(error.to_string())).ok()
}

/// Unwrap a JSON body, turning a malformed body into an [Error::InvalidTransaction].
///
/// axum rejects malformed JSON with its own plain text response, this keeps
/// the error body consistent with the validation errors.
pub fn parse_json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::InvalidTransaction(vec![rejection.body_text()]))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Category, Error,
        transaction::{Amount, Title, TransactionForm, TransactionPatch},
    };

    fn valid_form() -> TransactionForm {
        TransactionForm {
            title: "Groceries".to_owned(),
            amount: 82.4,
            date: "2024-03-09".to_owned(),
            category: "Need".to_owned(),
            notes: Some("Grocery, weekly".to_owned()),
        }
    }

    #[test]
    fn valid_form_produces_new_transaction() {
        let new_transaction = valid_form().validate().unwrap();

        assert_eq!(new_transaction.title.as_ref(), "Groceries");
        assert_eq!(new_transaction.amount.value(), 82.4);
        assert_eq!(new_transaction.date, date!(2024 - 03 - 09));
        assert_eq!(new_transaction.category, Category::Need);
        assert_eq!(new_transaction.notes.as_deref(), Some("Grocery, weekly"));
    }

    #[test]
    fn rejects_missing_title() {
        let form = TransactionForm {
            title: "".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::InvalidTransaction(vec![Error::EmptyTitle.to_string()]))
        );
    }

    #[test]
    fn rejects_non_positive_amount() {
        for amount in [0.0, -5.0] {
            let form = TransactionForm {
                amount,
                ..valid_form()
            };

            assert_eq!(
                form.validate(),
                Err(Error::InvalidTransaction(vec![
                    Error::InvalidAmount(amount).to_string()
                ]))
            );
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let form = TransactionForm {
            category: "Groceries".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::InvalidTransaction(vec![
                Error::InvalidCategory("Groceries".to_owned()).to_string()
            ]))
        );
    }

    #[test]
    fn reports_every_invalid_field() {
        let form = TransactionForm {
            title: " ".to_owned(),
            amount: -1.0,
            date: "yesterday".to_owned(),
            category: "Fun".to_owned(),
            notes: None,
        };

        match form.validate() {
            Err(Error::InvalidTransaction(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("want invalid transaction error, got {other:?}"),
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let update = TransactionPatch::default().validate().unwrap();

        assert_eq!(update, Default::default());
    }

    #[test]
    fn patch_validates_given_fields() {
        let patch = TransactionPatch {
            title: Some("Rent".to_owned()),
            amount: Some(410.0),
            notes: Some("".to_owned()),
            ..Default::default()
        };

        let update = patch.validate().unwrap();

        assert_eq!(update.title, Some(Title::new("Rent").unwrap()));
        assert_eq!(update.amount, Some(Amount::new(410.0).unwrap()));
        assert_eq!(update.date, None);
        assert_eq!(update.category, None);
        assert_eq!(update.notes, Some(Some("".to_owned())));
    }

    #[test]
    fn patch_rejects_invalid_amount() {
        let patch = TransactionPatch {
            amount: Some(0.0),
            ..Default::default()
        };

        assert_eq!(
            patch.validate(),
            Err(Error::InvalidTransaction(vec![
                Error::InvalidAmount(0.0).to_string()
            ]))
        );
    }

    #[test]
    fn patch_deserializes_from_partial_json() {
        let patch: TransactionPatch = serde_json::from_str(r#"{"category": "Debt"}"#).unwrap();

        assert_eq!(patch.category.as_deref(), Some("Debt"));
        assert_eq!(patch.title, None);
    }
}
