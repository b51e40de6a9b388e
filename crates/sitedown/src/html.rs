//! HTML parsing support.
//!
//! The converter never parses HTML itself. This module turns an HTML string
//! into the [`Node`] structure with `scraper`, and mirrors how a page is
//! captured before conversion: the whole body, the main content region, or
//! a selected fragment, with scripts and styles stripped out.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;
use crate::utilities::is_ignored;

/// Which part of a page to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Everything inside `<body>`
    #[default]
    Body,
    /// The first `<main>` (or `role="main"`) element, else the body
    Main,
    /// The input is a fragment already, such as a selection
    Fragment,
}

/// Parse an HTML fragment into a Node tree.
///
/// The result is a fragment root holding the parsed nodes, comments
/// included.
///
/// # Example
///
/// ```rust
/// use sitedown::{parse_html, SitedownService};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// let service = SitedownService::new();
/// let markdown = service.convert(&node).unwrap();
/// assert_eq!(markdown, "# Hello _World_\n");
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    Node::fragment_of(convert_children(document.root_element(), false))
}

/// Parse a page and extract the region selected by `mode`.
///
/// Elements that never contribute to Markdown (`script`, `style`, `head`
/// and the like) are dropped while the tree is built.
pub fn capture(html: &str, mode: Capture) -> Node {
    if mode == Capture::Fragment {
        let document = Html::parse_fragment(html);
        return Node::fragment_of(convert_children(document.root_element(), true));
    }

    let document = Html::parse_document(html);
    let main = match mode {
        Capture::Main => find_element(&document, |el| {
            el.value().name() == "main" || el.value().attr("role") == Some("main")
        }),
        _ => None,
    };
    let region = main.or_else(|| find_element(&document, |el| el.value().name() == "body"));

    let children = region
        .map(|element| convert_children(element, true))
        .unwrap_or_default();
    tracing::debug!(?mode, nodes = children.len(), "captured page region");
    Node::fragment_of(children)
}

/// The page's `<title>`, whitespace-collapsed, if it has a non-empty one
pub fn document_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = find_element(&document, |el| el.value().name() == "title")?;
    let text = title.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// First element in document order matching `predicate`
fn find_element<'a, F>(document: &'a Html, predicate: F) -> Option<ElementRef<'a>>
where
    F: Fn(&ElementRef<'a>) -> bool,
{
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| predicate(el))
}

/// Convert the children of a scraper element
fn convert_children(element: ElementRef, sanitize: bool) -> Vec<Node> {
    let mut children = Vec::new();

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => children.push(Node::text(&text.text)),
            ScraperNode::Comment(comment) => children.push(Node::comment(&comment.comment)),
            ScraperNode::Element(el) => {
                if sanitize && is_ignored(el.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    children.push(convert_element(child_element, sanitize));
                }
            }
            _ => {}
        }
    }

    children
}

/// Convert a scraper ElementRef to our Node structure
fn convert_element(element: ElementRef, sanitize: bool) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(element.value().name(), attrs);

    for child in convert_children(element, sanitize) {
        node.add_child(child);
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SitedownService;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>  My   Page </title><style>p { color: red }</style></head>
  <body>
    <nav><a href="/">Home</a></nav>
    <main>
      <h1>Article</h1>
      <script>track()</script>
      <p>Body text</p>
    </main>
  </body>
</html>"#;

    #[test]
    fn test_parse_simple_html() {
        let node = parse_html("<p>Hello World</p>");
        assert_eq!(node.tag_name(), crate::FRAGMENT_TAG);
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].tag_name(), "p");
    }

    #[test]
    fn test_parse_keeps_comments_and_attributes() {
        let node = parse_html(r#"<!-- note --><a href="/x" TITLE="t">x</a>"#);
        assert_eq!(node.children()[0], Node::comment(" note "));
        assert_eq!(node.children()[1].attr("title"), Some("t"));
    }

    #[test]
    fn test_convert_html() {
        let service = SitedownService::new();
        let result = service
            .convert_html("<p>Hello <strong>World</strong></p>")
            .unwrap();
        assert_eq!(result, "Hello **World**\n");
    }

    #[test]
    fn test_capture_main() {
        let service = SitedownService::new();
        let node = capture(PAGE, Capture::Main);
        assert_eq!(service.convert(&node).unwrap(), "# Article\n\nBody text\n");
    }

    #[test]
    fn test_capture_body() {
        let service = SitedownService::new();
        let node = capture(PAGE, Capture::Body);
        assert_eq!(
            service.convert(&node).unwrap(),
            "[Home](/)\n\n# Article\n\nBody text\n"
        );
    }

    #[test]
    fn test_capture_main_falls_back_to_body() {
        let node = capture("<body><p>Only</p></body>", Capture::Main);
        assert_eq!(SitedownService::new().convert(&node).unwrap(), "Only\n");
    }

    #[test]
    fn test_capture_fragment_strips_scripts() {
        let node = capture("<p>a</p><script>x()</script>", Capture::Fragment);
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title(PAGE), Some("My Page".to_string()));
        assert_eq!(document_title("<p>no title</p>"), None);
    }
}
