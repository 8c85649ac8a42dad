// ABOUTME: Value types produced by the normalizers: TableRecord, ArticleEntry, ArticleListing.
// ABOUTME: All are transient, created fresh per extraction call and never cached.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// One HTML table reduced to caption, column names and positional rows.
///
/// Rows are aligned to `columns` by position after filtration. The normalizer
/// never drops a row for a length mismatch, so use [`TableRecord::is_aligned`]
/// before relying on `row[i]` belonging to `columns[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub caption: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableRecord {
    /// Returns true when every row has exactly one cell per column.
    pub fn is_aligned(&self) -> bool {
        self.misaligned_rows().is_empty()
    }

    /// Indexes of rows whose cell count differs from the column count.
    pub fn misaligned_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() != self.columns.len())
            .map(|(i, _)| i)
            .collect()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A dated headline linking to a full article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleEntry {
    pub date: NaiveDate,
    pub headline: String,
    pub url: String,
}

/// An item that could not be turned into an [`ArticleEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedItem {
    /// Zero-based position of the row or list item in the source markup.
    pub index: usize,
    pub reason: TableError,
}

/// Result of scanning one listing: retained entries plus per-item rejections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleListing {
    pub entries: Vec<ArticleEntry>,
    pub rejected: Vec<RejectedItem>,
}

impl ArticleListing {
    pub(crate) fn reject(&mut self, index: usize, reason: TableError) {
        self.rejected.push(RejectedItem { index, reason });
    }
}
