//! Functions to parse transactions from CSV text.
//!
//! Two layouts are accepted: the full layout written by the export, where
//! columns are found by their header, and a simplified layout with the
//! columns `Title,Amount,Date,Category[,Notes]` in that order.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    csv_export::EXPORT_HEADERS,
    transaction::{NewTransaction, TransactionForm},
};

/// The number of columns a row in the simplified layout needs.
const SIMPLIFIED_MIN_COLUMNS: usize = 4;

/// A data row that could not be turned into a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// The uploaded file the row came from, if the text came from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// The line the row starts on, starting from 1 for the header.
    pub line: usize,
    /// Why the row was skipped.
    pub reason: String,
}

/// The transactions found after parsing CSV text.
#[derive(Debug, PartialEq)]
pub struct ParseCSVResult {
    /// The valid transactions, in file order. May be empty.
    pub transactions: Vec<NewTransaction>,
    /// The rows that were skipped because they were invalid.
    pub skipped: Vec<SkippedRow>,
}

/// The values of one CSV record and the line it starts on.
#[derive(Debug, Clone, PartialEq)]
struct CsvRecord {
    line: usize,
    values: Vec<String>,
}

impl CsvRecord {
    fn is_blank(&self) -> bool {
        match self.values.as_slice() {
            [value] => value.trim().is_empty(),
            _ => false,
        }
    }
}

/// Where the fields of a transaction are found in a row.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CsvLayout {
    /// The export layout, columns are located by header name.
    Full {
        title: usize,
        amount: usize,
        date: usize,
        category: usize,
        notes: usize,
    },
    /// Title, amount, date, category and optional notes, by position.
    Simplified,
}

impl CsvLayout {
    fn from_header(header: &[String]) -> Self {
        let headers: Vec<&str> = header.iter().map(|header| header.trim()).collect();
        let position = |name: &str| headers.iter().position(|header| *header == name);

        if !EXPORT_HEADERS.iter().all(|name| position(name).is_some()) {
            return CsvLayout::Simplified;
        }

        match (
            position("Title"),
            position("Amount"),
            position("Date"),
            position("Category"),
            position("Notes"),
        ) {
            (Some(title), Some(amount), Some(date), Some(category), Some(notes)) => {
                CsvLayout::Full {
                    title,
                    amount,
                    date,
                    category,
                    notes,
                }
            }
            _ => CsvLayout::Simplified,
        }
    }
}

/// Parse transactions from CSV text.
///
/// Expects `text` to be comma separated values with records separated by
/// `\n` (or `\r\n`), and the first record to be a header. A leading byte
/// order mark is ignored. Quoted values may hold commas, doubled quotes and
/// line breaks.
///
/// Each data row is parsed on its own: rows that are invalid are skipped and
/// reported in [ParseCSVResult::skipped] while the remaining rows are still
/// imported. Blank lines are ignored.
///
/// # Errors
/// Returns [Error::InvalidCSV] if `text` does not have a header and at least
/// one data row.
pub fn parse_csv(text: &str) -> Result<ParseCSVResult, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text).trim();
    let records = parse_csv_records(text);

    let data_rows: Vec<&CsvRecord> = records
        .iter()
        .skip(1)
        .filter(|record| !record.is_blank())
        .collect();

    let header = match records.first() {
        Some(header) if !data_rows.is_empty() => header,
        _ => {
            return Err(Error::InvalidCSV(
                "CSV file must contain headers and at least one data row".to_owned(),
            ));
        }
    };

    let layout = CsvLayout::from_header(&header.values);
    tracing::debug!("Parsing CSV with the {layout:?} layout");

    let mut transactions = Vec::new();
    let mut skipped = Vec::new();

    for record in data_rows {
        match parse_row(&record.values, layout) {
            Ok(transaction) => transactions.push(transaction),
            Err(error) => {
                tracing::warn!("Skipping invalid row {}: {error}", record.line);
                skipped.push(SkippedRow {
                    file_name: None,
                    line: record.line,
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(ParseCSVResult {
        transactions,
        skipped,
    })
}

fn parse_row(values: &[String], layout: CsvLayout) -> Result<NewTransaction, Error> {
    let value = |index: usize| values.get(index).map(|value| clean_value(value));

    let (title, amount, date, category, notes) = match layout {
        CsvLayout::Full {
            title,
            amount,
            date,
            category,
            notes,
        } => (
            value(title),
            value(amount),
            value(date),
            value(category),
            value(notes),
        ),
        CsvLayout::Simplified if values.len() < SIMPLIFIED_MIN_COLUMNS => {
            return Err(Error::InvalidCSV(format!(
                "expected at least {SIMPLIFIED_MIN_COLUMNS} columns, got {}",
                values.len()
            )));
        }
        CsvLayout::Simplified => (value(0), value(1), value(2), value(3), value(4)),
    };

    TransactionForm {
        title: title.unwrap_or_default(),
        amount: parse_amount(amount.as_deref().unwrap_or_default()),
        date: date.unwrap_or_default(),
        category: category.unwrap_or_default(),
        notes: notes.filter(|notes| !notes.is_empty()),
    }
    .validate()
}

/// Parse an amount, anything that is not a number becomes NaN and is
/// rejected by validation.
fn parse_amount(text: &str) -> f64 {
    text.parse().unwrap_or(f64::NAN)
}

/// Split CSV text into records of values.
///
/// A double quote toggles quoted mode, two double quotes inside quotes are a
/// literal double quote, a comma outside of quotes ends a value and a line
/// break outside of quotes ends a record. Line breaks inside quotes are kept
/// in the value.
fn parse_csv_records(text: &str) -> Vec<CsvRecord> {
    let mut records = Vec::new();
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = line;
    let mut chars = text.chars().peekable();

    while let Some(character) = chars.next() {
        match character {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => values.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                values.push(std::mem::take(&mut current));
                records.push(CsvRecord {
                    line: record_line,
                    values: std::mem::take(&mut values),
                });
                line += 1;
                record_line = line;
            }
            '\n' => {
                current.push('\n');
                line += 1;
            }
            character => current.push(character),
        }
    }

    values.push(current);
    records.push(CsvRecord {
        line: record_line,
        values,
    });

    records
}

/// Strip surrounding whitespace and one pair of surrounding double quotes.
fn clean_value(value: &str) -> String {
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value);

    value.trim().to_owned()
}

#[cfg(test)]
mod parse_csv_records_tests {
    use super::{clean_value, parse_csv_records};

    fn values(text: &str) -> Vec<Vec<String>> {
        parse_csv_records(text)
            .into_iter()
            .map(|record| record.values)
            .collect()
    }

    #[test]
    fn splits_on_commas() {
        assert_eq!(values("a,b,c"), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn keeps_commas_inside_quotes() {
        assert_eq!(
            values("\"Grocery, weekly\",82.4"),
            vec![vec!["Grocery, weekly", "82.4"]]
        );
    }

    #[test]
    fn doubled_quotes_are_literal_quotes() {
        assert_eq!(
            values("\"said \"\"hi\"\"\",1"),
            vec![vec!["said \"hi\"", "1"]]
        );
    }

    #[test]
    fn keeps_empty_values() {
        assert_eq!(values("a,,\"\","), vec![vec!["a", "", "", ""]]);
    }

    #[test]
    fn line_break_inside_quotes_continues_the_record() {
        let records = parse_csv_records("h1,h2\r\n\"a\nb\",1\n\nc,2");

        let summary: Vec<(usize, Vec<String>)> = records
            .into_iter()
            .map(|record| (record.line, record.values))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, vec!["h1".to_owned(), "h2".to_owned()]),
                (2, vec!["a\nb".to_owned(), "1".to_owned()]),
                (4, vec![String::new()]),
                (5, vec!["c".to_owned(), "2".to_owned()]),
            ]
        );
    }

    #[test]
    fn clean_value_strips_quotes_and_whitespace() {
        assert_eq!(clean_value("  Rent "), "Rent");
        assert_eq!(clean_value("\" Rent \""), "Rent");
        assert_eq!(clean_value("\"Rent"), "\"Rent");
    }
}
