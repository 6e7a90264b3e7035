//! Walking the content that follows an anchor element
//!
//! Documentation rarely nests an endpoint's tables inside the heading that
//! names it. The section of an anchor is the run of following siblings up to
//! the next heading of the same or a higher level, or the next endpoint line.

use crate::extract::endpoint::parse_endpoint_line;
use crate::extract::text::{class_contains, element_text, heading_level, spaced_text};
use scraper::{ElementRef, Selector};

/// A table together with the label that introduced it
#[derive(Debug, Clone)]
pub struct LabelledTable<'a> {
    pub element: ElementRef<'a>,
    pub label: Option<String>,
}

/// What was found between an anchor and the end of its section
#[derive(Debug, Clone, Default)]
pub struct Section<'a> {
    pub description: Option<String>,
    pub tables: Vec<LabelledTable<'a>>,
    pub definition_lists: Vec<ElementRef<'a>>,
}

/// Short text before a table that names it, such as "Query parameters:"
const MAX_LABEL_LEN: usize = 60;

const CONTAINERS: &[&str] = &["div", "section", "article", "details", "aside", "main"];

struct Walk<'a> {
    /// False inside an endpoint or schema block, where the walk covers the
    /// whole block
    bounded: bool,
    stop_level: u8,
    label: Option<String>,
    section: Section<'a>,
}

enum Step {
    Continue,
    Stop,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, element: ElementRef<'a>) -> Step {
        let name = element.value().name();

        if let Some(level) = heading_level(&element) {
            let endpoint_line = parse_endpoint_line(&spaced_text(&element)).is_some();
            if self.bounded && (level <= self.stop_level || endpoint_line) {
                return Step::Stop;
            }
            if endpoint_line {
                return Step::Continue;
            }
            self.label = Some(element_text(&element));
            return Step::Continue;
        }

        match name {
            "table" => {
                let caption = Selector::parse("caption")
                    .ok()
                    .and_then(|s| element.select(&s).next())
                    .map(|c| element_text(&c));
                self.section.tables.push(LabelledTable {
                    element,
                    label: caption.or_else(|| self.label.clone()),
                });
            }
            "dl" => self.section.definition_lists.push(element),
            "p" | "pre" => {
                let text = element_text(&element);
                if is_exact_endpoint_line(&element) {
                    return if self.bounded { Step::Stop } else { Step::Continue };
                }
                if text.ends_with(':') && text.len() <= MAX_LABEL_LEN {
                    self.label = Some(text);
                } else if self.section.description.is_none() && name == "p" && !text.is_empty() {
                    self.section.description = Some(text);
                }
            }
            _ if CONTAINERS.contains(&name) => {
                if self.bounded && class_contains(&element, &["endpoint", "operation", "api-method"]) {
                    return Step::Stop;
                }
                return self.visit_descendants(element);
            }
            _ => {}
        }
        Step::Continue
    }

    fn visit_descendants(&mut self, container: ElementRef<'a>) -> Step {
        let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6, table, dl, p, pre") else {
            return Step::Continue;
        };
        for element in container.select(&selector) {
            if inside_table(&element, &container) {
                continue;
            }
            if let Step::Stop = self.visit(element) {
                return Step::Stop;
            }
        }
        Step::Continue
    }
}

/// True if `element` sits inside a table or list below `container`
fn inside_table(element: &ElementRef<'_>, container: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .take_while(|node| node.id() != container.id())
        .filter_map(|node| node.value().as_element())
        .any(|e| matches!(e.name(), "table" | "dl"))
}

fn is_exact_endpoint_line(element: &ElementRef<'_>) -> bool {
    crate::extract::endpoint::parse_exact_endpoint_line(&spaced_text(element)).is_some()
}

/// Collects the section that follows `anchor`
///
/// When the anchor has no element siblings (a heading wrapped in its own
/// `<div>`), the walk continues from the anchor's parent instead.
pub fn collect_section<'a>(anchor: ElementRef<'a>, stop_level: u8) -> Section<'a> {
    let mut walk = Walk {
        bounded: true,
        stop_level,
        label: None,
        section: Section::default(),
    };

    let start = if anchor.next_siblings().any(|n| n.value().is_element()) {
        Some(anchor)
    } else {
        anchor.parent().and_then(ElementRef::wrap)
    };

    if let Some(start) = start {
        for sibling in start.next_siblings().filter_map(ElementRef::wrap) {
            if let Step::Stop = walk.visit(sibling) {
                break;
            }
        }
    }

    walk.section
}

/// Collects everything inside a block element
pub fn collect_within(block: ElementRef<'_>) -> Section<'_> {
    let mut walk = Walk {
        bounded: false,
        stop_level: 0,
        label: None,
        section: Section::default(),
    };
    walk.visit_descendants(block);
    walk.section
}
