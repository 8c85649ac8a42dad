// ABOUTME: HTML document assembly for normalized tables ahead of PDF rendering.
// ABOUTME: Emits a titled document with a fixed print stylesheet and escaped cell text.

//! Document assembly.
//!
//! Each [`TableRecord`] becomes a `<div>` holding an optional `<h3>` caption
//! and a `<table>` with a single header row. Tables keep the order they had
//! on the source page.

use gameday_tables::TableRecord;
use once_cell::sync::Lazy;
use scraper::{Html, Node, Selector};

static HEAD: Lazy<Selector> = Lazy::new(|| Selector::parse("head").unwrap());
static BASE: Lazy<Selector> = Lazy::new(|| Selector::parse("base").unwrap());

const PRINT_STYLE: &str = "table {width: 100%; border-collapse: collapse;} \
thead {display: table-row-group;} \
th, td {font-size: 12px; border: 1px solid #ddd; padding: 8px; text-align: left;} \
th {background-color: #f4f4f4;}";

fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Assemble a printable HTML document from tables.
pub fn build_table_document(title: &str, tables: &[TableRecord]) -> String {
    let mut out = String::new();
    let title = escape(title);
    out.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{PRINT_STYLE}</style></head><body><h1>{title}</h1>"
    ));

    for table in tables {
        out.push_str("<div>");
        if let Some(caption) = &table.caption {
            out.push_str(&format!("<h3>{}</h3>", escape(caption)));
        }
        out.push_str("<table><thead><tr>");
        for column in &table.columns {
            out.push_str(&format!("<th>{}</th>", escape(column)));
        }
        out.push_str("</tr></thead><tbody>");
        for row in &table.rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str(&format!("<td>{}</td>", escape(cell)));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table></div>");
    }

    out.push_str("</body></html>");
    out
}

/// Insert a `<base href>` as the first child of `<head>` so relative links
/// and images resolve when printed. The document is reserialized.
pub fn with_base_href(html: &str, base: &str) -> String {
    let mut doc = Html::parse_document(html);
    let head = doc.select(&HEAD).next().map(|h| h.id());
    if let (Some(id), Some(node)) = (head, base_element(base)) {
        if let Some(mut head) = doc.tree.get_mut(id) {
            head.prepend(node);
        }
    }
    doc.html()
}

fn base_element(href: &str) -> Option<Node> {
    let markup = format!(
        "<base href=\"{}\">",
        href.replace('&', "&amp;").replace('"', "&quot;")
    );
    let fragment = Html::parse_fragment(&markup);
    let base = fragment.select(&BASE).next()?;
    Some(Node::Element(base.value().clone()))
}
