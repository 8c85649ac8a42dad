// ABOUTME: Page-level table collection: every qualifying table on a rendered page, in order.
// ABOUTME: Malformed tables (no header or no body) are skipped rather than reported.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::models::TableRecord;
use crate::table::normalize_table;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());

/// Normalizes every table on a page. Document order is preserved.
pub fn collect_tables(page_html: &str, ignore: &BTreeSet<String>) -> Vec<TableRecord> {
    let doc = Html::parse_document(page_html);
    collect_tables_in(&doc, ignore)
}

/// Same as [`collect_tables`] for an already parsed document.
pub fn collect_tables_in(doc: &Html, ignore: &BTreeSet<String>) -> Vec<TableRecord> {
    doc.select(&TABLE)
        .filter_map(|table| normalize_table(table, ignore))
        .collect()
}
