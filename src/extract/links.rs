//! Link and title extraction
//!
//! Navigation out of a documentation page is plain `<a href>`: sidebars,
//! breadcrumbs, "next page" footers and cross references into the
//! reference section all look the same here. Scope and skip patterns are
//! applied later by the crawler.

use crate::extract::text::element_text;
use scraper::{Html, Selector};
use url::Url;

/// Extracts the page title
///
/// Precedence: the `<title>` element, then the first heading (`h1`..`h6`)
/// in document order, then the page URL itself.
pub fn extract_title(document: &Html, page_url: &Url) -> String {
    first_text(document, "title")
        .or_else(|| first_text(document, "h1, h2, h3, h4, h5, h6"))
        .unwrap_or_else(|| page_url.to_string())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|element| element_text(&element))
        .find(|text| !text.is_empty())
}

/// Collects the targets of every `<a href>` on the page, resolved against
/// the page URL
///
/// Empty and `#fragment` hrefs, `download` anchors and anything that does
/// not resolve to an http(s) URL (`javascript:`, `mailto:`, `tel:`,
/// `data:`, ...) are dropped. Order follows the document and duplicates
/// are kept.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<String> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchors)
        .filter(|anchor| anchor.value().attr("download").is_none())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(href, page_url))
        .collect()
}

fn resolve_href(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let target = page_url.join(href).ok()?;
    match target.scheme() {
        "http" | "https" => Some(target.into()),
        _ => None,
    }
}
