// ABOUTME: Error types for table and listing normalization.
// ABOUTME: Provides TableError with DateParse, MissingColumn, MissingField, and InvalidRange variants.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while turning listing markup into structured entries.
///
/// Date and field errors on one row or list item are recorded against that
/// item and the scan continues. The article table scan returns
/// `MissingColumn` or `MissingField` when the table itself is unusable, which
/// rejects the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A date label did not match the expected format.
    #[error("unparseable date {value:?} (expected {format})")]
    DateParse { value: String, format: &'static str },

    /// A required column is absent from the table header.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A required element inside a row or list item is absent.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The requested date range is inverted.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl TableError {
    /// Creates a DateParse error for the given raw value and chrono format string.
    pub fn date_parse(value: impl Into<String>, format: &'static str) -> Self {
        TableError::DateParse {
            value: value.into(),
            format,
        }
    }

    /// Creates a MissingColumn error.
    pub fn missing_column(name: impl Into<String>) -> Self {
        TableError::MissingColumn(name.into())
    }
}
