// ABOUTME: HTML text helpers shared by the normalizers.
// ABOUTME: Provides whitespace collapsing, element text extraction, and base-URL joining.

use scraper::ElementRef;
use url::Url;

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}

/// Concatenated descendant text of an element, whitespace-collapsed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Resolves an href against a site's base URL.
///
/// Absolute URLs pass through unchanged. A root-relative path (`/x`) is
/// appended to the base, so a base with a path prefix keeps it. Anything
/// else, including protocol-relative (`//host/x`) and dot-relative hrefs,
/// is joined with the base treated as a directory.
pub fn absolutize(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return href.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') && !href.starts_with("//") {
        return format!("{}{}", base, href);
    }

    match Url::parse(&format!("{}/", base)).and_then(|b| b.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{}/{}", base, href),
    }
}

/// True for empty or fragment-only hrefs that lead nowhere.
pub fn is_placeholder_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href == "#"
}
