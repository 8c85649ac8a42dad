// ABOUTME: Table normalizer turning one HTML <table> into a TableRecord.
// ABOUTME: Drops ignored columns by header index and strips injected "Skip Ad" cells from rows.

//! Table normalization.
//!
//! Key behaviors:
//! - A table without a `<thead>` or without a `<tbody>` yields `None`.
//! - Header cells whose text is in the ignore set are dropped and their
//!   positions remembered; body cells are dropped at the same positions.
//! - Cells reading exactly "Skip Ad" are removed before positional filtering.
//! - Rows are kept even when their length disagrees with the columns; longer
//!   rows are cut to the column count, shorter rows stay short.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::html_utils::element_text;
use crate::models::TableRecord;

/// Text of advertisement cells injected into schedule and roster grids.
pub const AD_CELL_TEXT: &str = "Skip Ad";

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());

/// Normalizes a table element. Returns `None` for tables missing a header or body section.
pub fn normalize_table(table: ElementRef<'_>, ignore: &BTreeSet<String>) -> Option<TableRecord> {
    let thead = child_named(table, "thead")?;
    let tbody = child_named(table, "tbody")?;

    let mut ignored_indexes = HashSet::new();
    let mut columns = Vec::new();
    for (i, th) in thead.select(&HEADER_CELL).enumerate() {
        let text = element_text(&th);
        if ignore.contains(&text) {
            ignored_indexes.insert(i);
        } else {
            columns.push(text);
        }
    }
    let columns = disambiguate(columns);

    let rows = body_rows_of(tbody)
        .into_iter()
        .map(|tr| row_values(tr, &ignored_indexes, columns.len()))
        .collect();

    let caption = child_named(table, "caption")
        .map(|c| element_text(&c))
        .filter(|c| !c.is_empty());

    Some(TableRecord {
        caption,
        columns,
        rows,
    })
}

/// Parses `markup` and normalizes the first table found in it.
pub fn normalize_table_html(markup: &str, ignore: &BTreeSet<String>) -> Option<TableRecord> {
    let doc = Html::parse_fragment(markup);
    let table = doc.select(&TABLE).next()?;
    normalize_table(table, ignore)
}

/// The `<tr>` children of a table's body section, in document order.
///
/// Index `i` of this list corresponds to row `i` of the record produced by
/// [`normalize_table`] for the same table.
pub fn body_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    child_named(table, "tbody")
        .map(body_rows_of)
        .unwrap_or_default()
}

fn body_rows_of(tbody: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    tbody
        .child_elements()
        .filter(|el| el.value().name() == "tr")
        .collect()
}

/// Cell texts of a body row after ad removal and ignored-index filtering.
fn row_values(tr: ElementRef<'_>, ignored: &HashSet<usize>, width: usize) -> Vec<String> {
    row_cells(tr)
        .into_iter()
        .map(|cell| element_text(&cell))
        .filter(|text| text != AD_CELL_TEXT)
        .enumerate()
        .filter(|(i, _)| !ignored.contains(i))
        .map(|(_, text)| text)
        .take(width)
        .collect()
}

/// Data and header cells that are direct children of a row.
///
/// Body rows keep their `th` cells too; stat tables often mark the player
/// name column as a row header.
pub fn row_cells(tr: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    tr.child_elements()
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

fn child_named<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.child_elements().find(|c| c.value().name() == name)
}

/// Suffixes repeated column names (".1", ".2", ...) so names stay unique.
fn disambiguate(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            let out = if *count == 0 {
                name.clone()
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ignore(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    const ROSTER: &str = r#"
        <table>
          <caption> 2024 Men's Soccer Roster </caption>
          <thead><tr><th>No.</th><th>Name</th><th>Hometown</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>Sam Keller</td><td>Evanston, Ill.</td></tr>
            <tr><td>7</td><td>Luis Ortega</td><td>Austin, Texas</td></tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn normalizes_caption_columns_and_rows() {
        let record = normalize_table_html(ROSTER, &ignore(&[])).unwrap();
        assert_eq!(record.caption.as_deref(), Some("2024 Men's Soccer Roster"));
        assert_eq!(record.columns, strings(&["No.", "Name", "Hometown"]));
        assert_eq!(
            record.rows,
            vec![
                strings(&["1", "Sam Keller", "Evanston, Ill."]),
                strings(&["7", "Luis Ortega", "Austin, Texas"]),
            ]
        );
        assert!(record.is_aligned());
    }

    #[test]
    fn ignored_column_drops_cells_at_same_index() {
        let record = normalize_table_html(ROSTER, &ignore(&["Name"])).unwrap();
        assert_eq!(record.columns, strings(&["No.", "Hometown"]));
        assert_eq!(record.rows[0], strings(&["1", "Evanston, Ill."]));
        assert_eq!(record.rows[1], strings(&["7", "Austin, Texas"]));
    }

    #[test]
    fn ad_cell_removed_before_index_filtering() {
        let html = r#"
            <table>
              <thead><tr><th>A</th><th>B</th><th>C</th></tr></thead>
              <tbody><tr><td>x</td><td>Skip Ad</td><td>y</td></tr></tbody>
            </table>
        "#;
        let record = normalize_table_html(html, &ignore(&[])).unwrap();
        assert_eq!(record.rows, vec![strings(&["x", "y"])]);
        assert!(!record.is_aligned());
    }

    #[test]
    fn header_without_body_is_absent() {
        let html = "<table><thead><tr><th>A</th></tr></thead></table>";
        assert_eq!(normalize_table_html(html, &ignore(&[])), None);
    }

    #[test]
    fn body_without_header_is_absent() {
        let html = "<table><tbody><tr><td>1</td></tr></tbody></table>";
        assert_eq!(normalize_table_html(html, &ignore(&[])), None);
    }

    #[test]
    fn missing_caption_is_none() {
        let html = "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>";
        let record = normalize_table_html(html, &ignore(&[])).unwrap();
        assert_eq!(record.caption, None);
    }

    #[test]
    fn long_rows_are_cut_to_column_count() {
        let html = r#"
            <table>
              <thead><tr><th>A</th><th>B</th></tr></thead>
              <tbody><tr><td>1</td><td>2</td><td>3</td></tr></tbody>
            </table>
        "#;
        let record = normalize_table_html(html, &ignore(&[])).unwrap();
        assert_eq!(record.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn row_header_cells_count_as_cells() {
        let html = r#"
            <table>
              <thead><tr><th>No.</th><th>Name</th></tr></thead>
              <tbody><tr><td>4</td><th scope="row">Eli Brandt</th></tr></tbody>
            </table>
        "#;
        let record = normalize_table_html(html, &ignore(&[])).unwrap();
        assert_eq!(record.rows, vec![strings(&["4", "Eli Brandt"])]);
    }

    #[test]
    fn duplicate_column_names_are_suffixed() {
        let html = r#"
            <table>
              <thead><tr><th>Score</th><th>Score</th><th></th><th></th></tr></thead>
              <tbody></tbody>
            </table>
        "#;
        let record = normalize_table_html(html, &ignore(&[])).unwrap();
        assert_eq!(record.columns, strings(&["Score", "Score.1", "", ".1"]));
        assert!(record.rows.is_empty());
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let first = normalize_table_html(ROSTER, &ignore(&["Hometown"]));
        let second = normalize_table_html(ROSTER, &ignore(&["Hometown"]));
        assert_eq!(first, second);
    }

    #[test]
    fn body_rows_match_record_rows() {
        let doc = Html::parse_fragment(ROSTER);
        let table = doc.select(&TABLE).next().unwrap();
        let record = normalize_table(table, &ignore(&[])).unwrap();
        assert_eq!(body_rows(table).len(), record.rows.len());
    }
}
