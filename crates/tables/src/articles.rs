// ABOUTME: Reduces a single dated news table into ArticleEntry values.
// ABOUTME: The date column's name selects the date format: "Posted" is MM/DD/YYYY, "Date" is Month DD, YYYY.

//! Article-table reduction.
//!
//! Archive pages that render stories as a table carry a `Posted` or `Date`
//! column and a `Title` or `Headline` column. `Sport`, `Category` and unnamed
//! columns are ignored. Each body row contributes the first anchor whose href
//! is not a placeholder as the article link.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::TableError;
use crate::html_utils::{absolutize, is_placeholder_href};
use crate::models::{ArticleEntry, ArticleListing, TableRecord};
use crate::table::{body_rows, normalize_table};
use crate::time_parse::{DateFormat, DateRange};

/// Columns dropped from article tables before reduction.
pub const IGNORED_ARTICLE_COLUMNS: &[&str] = &["Sport", "Category", ""];

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Reduces an article table into dated entries within `range`.
///
/// Fails as a whole only when the table is malformed or lacks a date or
/// headline column; individual bad rows land in `rejected`.
pub fn scan_article_table(
    table: ElementRef<'_>,
    base_url: &str,
    range: &DateRange,
) -> Result<ArticleListing, TableError> {
    let ignore: BTreeSet<String> = IGNORED_ARTICLE_COLUMNS.iter().map(|s| s.to_string()).collect();
    let record = normalize_table(table, &ignore).ok_or(TableError::MissingField("table header or body"))?;

    let (date_idx, format) = date_column(&record)?;
    let headline_idx = record
        .column_index("Title")
        .or_else(|| record.column_index("Headline"))
        .ok_or_else(|| TableError::missing_column("Title"))?;

    let rows = body_rows(table);
    let mut listing = ArticleListing::default();

    for (index, (cells, tr)) in record.rows.iter().zip(rows).enumerate() {
        let (Some(raw_date), Some(headline)) = (cells.get(date_idx), cells.get(headline_idx)) else {
            listing.reject(index, TableError::MissingField("row cells"));
            continue;
        };

        let date = match format.parse(raw_date) {
            Ok(date) => date,
            Err(reason) => {
                listing.reject(index, reason);
                continue;
            }
        };
        if !range.contains(date) {
            continue;
        }

        let Some(href) = first_link(tr) else {
            listing.reject(index, TableError::MissingField("article link"));
            continue;
        };

        listing.entries.push(ArticleEntry {
            date,
            headline: headline.clone(),
            url: absolutize(base_url, href),
        });
    }

    Ok(listing)
}

/// Parses `page_html` and reduces its first table.
pub fn scan_article_page(
    page_html: &str,
    base_url: &str,
    range: &DateRange,
) -> Result<ArticleListing, TableError> {
    let doc = Html::parse_document(page_html);
    let table = doc
        .select(&TABLE)
        .next()
        .ok_or(TableError::MissingField("article table"))?;
    scan_article_table(table, base_url, range)
}

fn date_column(record: &TableRecord) -> Result<(usize, DateFormat), TableError> {
    if let Some(i) = record.column_index("Posted") {
        return Ok((i, DateFormat::Slash));
    }
    if let Some(i) = record.column_index("Date") {
        return Ok((i, DateFormat::Long));
    }
    Err(TableError::missing_column("Posted or Date"))
}

fn first_link<'a>(tr: ElementRef<'a>) -> Option<&'a str> {
    tr.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| !is_placeholder_href(href))
}
