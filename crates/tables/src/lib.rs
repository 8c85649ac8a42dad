// ABOUTME: Pure HTML normalizers for athletics-site tables and article listings.
// ABOUTME: Provides table, list, page, and article-table extraction plus date parsing helpers.

pub mod articles;
pub mod collect;
pub mod error;
pub mod html_utils;
pub mod list;
pub mod models;
pub mod table;
pub mod time_parse;

pub use articles::{scan_article_page, scan_article_table};
pub use collect::{collect_tables, collect_tables_in};
pub use error::TableError;
pub use html_utils::{absolutize, collapse_whitespace, element_text, is_placeholder_href};
pub use list::{normalize_list, normalize_list_html};
pub use models::{ArticleEntry, ArticleListing, RejectedItem, TableRecord};
pub use table::{normalize_table, normalize_table_html, AD_CELL_TEXT};
pub use time_parse::{parse_iso_date, parse_long_date, parse_slash_date, DateFormat, DateRange};
