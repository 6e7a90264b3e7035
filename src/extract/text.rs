//! Text helpers shared by the matchers

use scraper::ElementRef;

/// Concatenated text of an element with whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of an element with a space between text nodes
///
/// `<span>GET</span><code>/users</code>` reads as `GET /users` here, where
/// `element_text` would give `GET/users`.
pub fn spaced_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if any class of the element contains one of `needles`
pub fn class_contains(element: &ElementRef<'_>, needles: &[&str]) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_ascii_lowercase();
        needles.iter().any(|needle| class.contains(needle))
    })
}

/// Heading level for `h1`..`h6`
pub fn heading_level(element: &ElementRef<'_>) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, selector: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(selector).unwrap()).next().unwrap()
    }

    #[test]
    fn test_element_vs_spaced_text() {
        let doc = Html::parse_fragment("<h3><span>GET</span><code>/users</code></h3>");
        let h3 = first(&doc, "h3");
        assert_eq!(element_text(&h3), "GET/users");
        assert_eq!(spaced_text(&h3), "GET /users");
    }

    #[test]
    fn test_class_contains() {
        let doc = Html::parse_fragment(r#"<div class="doc-Endpoint-block wide"></div>"#);
        let div = first(&doc, "div");
        assert!(class_contains(&div, &["endpoint"]));
        assert!(!class_contains(&div, &["schema"]));
    }

    #[test]
    fn test_heading_level() {
        let doc = Html::parse_fragment("<h4>x</h4><p>y</p>");
        assert_eq!(heading_level(&first(&doc, "h4")), Some(4));
        assert_eq!(heading_level(&first(&doc, "p")), None);
    }
}
