use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Price table dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("Symbol '{0}' appears more than once in the price table")]
    DuplicateSymbol(String),

    #[error("Row for {date} has {actual} cells but the table has {expected} symbols")]
    RowWidthMismatch {
        date: NaiveDate,
        expected: usize,
        actual: usize,
    },

    #[error("Price table has {dates} dates but {rows} rows")]
    RowCountMismatch { dates: usize, rows: usize },

    #[error("Quantity for '{0}' must be at least 1")]
    InvalidQuantity(String),
}
