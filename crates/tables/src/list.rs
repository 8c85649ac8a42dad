// ABOUTME: List normalizer turning an archive <ul> of stories into dated ArticleEntry values.
// ABOUTME: Parses "Date: Month DD, YYYY" labels and keeps only entries inside an inclusive range.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::TableError;
use crate::html_utils::{absolutize, element_text};
use crate::models::{ArticleEntry, ArticleListing};
use crate::time_parse::{parse_long_date, DateRange};

/// Prefix in front of the date inside an archive item's metadata span.
pub const DATE_LABEL_PREFIX: &str = "Date: ";

static LIST: Lazy<Selector> = Lazy::new(|| Selector::parse("ul, ol").unwrap());
static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li.vue-archives-item").unwrap());
static DATE_LABEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.vue-archives-item--metadata span").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Normalizes the archive items of a list element.
///
/// An item whose date label is missing or unparseable is recorded in
/// `rejected` and skipped; the remaining items are still processed.
pub fn normalize_list(list: ElementRef<'_>, base_url: &str, range: &DateRange) -> ArticleListing {
    let mut listing = ArticleListing::default();

    for (index, li) in list.select(&ITEM).enumerate() {
        let date = match item_date(&li) {
            Ok(date) => date,
            Err(reason) => {
                listing.reject(index, reason);
                continue;
            }
        };

        if !range.contains(date) {
            continue;
        }

        let Some(anchor) = li.select(&ANCHOR).next() else {
            listing.reject(index, TableError::MissingField("article link"));
            continue;
        };
        let href = anchor.value().attr("href").unwrap_or_default();

        listing.entries.push(ArticleEntry {
            date,
            headline: element_text(&anchor),
            url: absolutize(base_url, href),
        });
    }

    listing
}

/// Parses `markup` and normalizes the first list found in it.
pub fn normalize_list_html(markup: &str, base_url: &str, range: &DateRange) -> ArticleListing {
    let doc = Html::parse_fragment(markup);
    match doc.select(&LIST).next() {
        Some(list) => normalize_list(list, base_url, range),
        None => ArticleListing::default(),
    }
}

fn item_date(li: &ElementRef<'_>) -> Result<chrono::NaiveDate, TableError> {
    let span = li
        .select(&DATE_LABEL)
        .next()
        .ok_or(TableError::MissingField("date label"))?;
    let text = element_text(&span);
    let raw = text.strip_prefix(DATE_LABEL_PREFIX).unwrap_or(&text);
    parse_long_date(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn item(date: &str, headline: &str, href: &str) -> String {
        format!(
            r#"<li class="vue-archives-item flex">
                 <div class="vue-archives-item--metadata"><span>Date: {date}</span></div>
                 <a href="{href}">{headline}</a>
               </li>"#
        )
    }

    fn archive(items: &[String]) -> String {
        format!("<ul>{}</ul>", items.concat())
    }

    #[test]
    fn keeps_entries_on_range_boundaries() {
        let html = archive(&[
            item("August 31, 2024", "Too early", "/news/1"),
            item("September 1, 2024", "Opener", "/news/2"),
            item("September 30, 2024", "Month end", "/news/3"),
            item("October 1, 2024", "Too late", "/news/4"),
        ]);
        let range = DateRange::new(d(2024, 9, 1), d(2024, 9, 30)).unwrap();
        let listing = normalize_list_html(&html, "https://nusports.com", &range);

        let headlines: Vec<&str> = listing.entries.iter().map(|e| e.headline.as_str()).collect();
        assert_eq!(headlines, vec!["Opener", "Month end"]);
        assert_eq!(listing.entries[0].url, "https://nusports.com/news/2");
        assert_eq!(listing.entries[0].date, d(2024, 9, 1));
        assert!(listing.rejected.is_empty());
    }

    #[test]
    fn bad_date_skips_only_that_item() {
        let html = archive(&[
            item("Sept. 3rd", "Garbled", "/news/1"),
            item("September 4, 2024", "Fine", "/news/2"),
        ]);
        let range = DateRange::new(d(2024, 9, 1), d(2024, 9, 30)).unwrap();
        let listing = normalize_list_html(&html, "https://nusports.com", &range);

        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].headline, "Fine");
        assert_eq!(listing.rejected.len(), 1);
        assert_eq!(listing.rejected[0].index, 0);
        assert!(matches!(listing.rejected[0].reason, TableError::DateParse { .. }));
    }

    #[test]
    fn items_without_archive_class_are_ignored() {
        let html = format!(
            "<ul><li class=\"promo\"><a href=\"/tix\">Tickets</a></li>{}</ul>",
            item("September 4, 2024", "Fine", "/news/2")
        );
        let range = DateRange::new(d(2024, 9, 1), d(2024, 9, 30)).unwrap();
        let listing = normalize_list_html(&html, "https://nusports.com", &range);
        assert_eq!(listing.entries.len(), 1);
    }

    #[test]
    fn no_list_yields_empty_listing() {
        let range = DateRange::new(d(2024, 9, 1), d(2024, 9, 30)).unwrap();
        let listing = normalize_list_html("<div>nothing</div>", "https://x.edu", &range);
        assert_eq!(listing, ArticleListing::default());
    }
}
