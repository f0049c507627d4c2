//! HTML-to-token extraction
//!
//! This module turns raw page markup into the ordered sequence of
//! [`Element`]s the index is built from:
//! - `style`, `script`, `meta` and `template` subtrees are dropped
//! - comments never contribute text
//! - every element owning direct text yields one Element per token
//! - tokens inside an anchor carry that anchor's filtered link
//!
//! Positions are page-global: they count every Element emitted so far for the
//! page and are never reset per tag.

mod tokenizer;

pub use tokenizer::tokenize;

use crate::url::filter_link;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Tags whose subtrees never contribute words
const SKIPPED_TAGS: &[&str] = &["style", "script", "meta", "template"];

/// One tokenized unit of a page
///
/// A single position can carry a word and belong to an anchor at the same
/// time, so the ids resolved by the index store are kept as independent
/// optional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lower-cased token
    pub word: String,

    /// Page-global position, starting at 0
    pub position: usize,

    /// Filtered target of the enclosing anchor, if any
    pub href: Option<String>,

    /// Word id assigned by the index (None for stopwords or before indexing)
    pub word_id: Option<i64>,

    /// URL id of `href` assigned by the index
    pub link_id: Option<i64>,

    /// Link edge id from this page to `href`
    pub edge_id: Option<i64>,
}

impl Element {
    pub fn new(word: impl Into<String>, position: usize, href: Option<String>) -> Self {
        Self {
            word: word.into(),
            position,
            href,
            word_id: None,
            link_id: None,
            edge_id: None,
        }
    }
}

/// Extracts the ordered element sequence of a page
///
/// # Arguments
///
/// * `html` - Raw page markup
///
/// # Returns
///
/// Elements in document order; `elements[i].position == i`.
///
/// # Example
///
/// ```
/// use sumi_seek::extractor::extract_elements;
///
/// let html = r#"<p>Hello world</p><a href="https://example.com/">Go there</a>"#;
/// let elements = extract_elements(html);
///
/// assert_eq!(elements.len(), 4);
/// assert_eq!(elements[2].word, "go");
/// assert_eq!(elements[2].position, 2);
/// assert_eq!(elements[2].href.as_deref(), Some("https://example.com"));
/// ```
pub fn extract_elements(html: &str) -> Vec<Element> {
    let document = Html::parse_document(html);
    let mut elements = Vec::new();

    // Pre-order walk so positions follow document order
    let mut stack = vec![document.root_element()];
    while let Some(element) = stack.pop() {
        let name = element.value().name();
        if SKIPPED_TAGS.contains(&name) {
            continue;
        }

        let own_text = direct_text(&element);
        if !own_text.is_empty() {
            let href = if name == "a" {
                element.value().attr("href").and_then(filter_link)
            } else {
                None
            };

            for word in tokenize(&own_text) {
                let position = elements.len();
                elements.push(Element::new(word, position, href.clone()));
            }
        }

        let children: Vec<ElementRef> = element.children().filter_map(ElementRef::wrap).collect();
        stack.extend(children.into_iter().rev());
    }

    elements
}

/// Concatenates the text nodes that are direct children of an element
fn direct_text(element: &ElementRef) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let Node::Text(chunk) = child.value() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(chunk);
        }
    }
    text
}
