//! Whitespace handling that mirrors CSS `white-space: normal`.
//!
//! Every tag is classified as block, inline or preformatted. Text inside a
//! preformatted element is significant and kept verbatim; everywhere else runs
//! of whitespace collapse to one space, and whitespace-only text that only
//! separates blocks is dropped.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Node, FRAGMENT_TAG};

/// How an element takes part in layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Starts on its own line, separated from siblings by a blank line
    Block,
    /// Flows with the surrounding text
    Inline,
    /// Block whose text keeps its whitespace
    Preformatted,
}

impl Display {
    /// Block and preformatted elements both break the text flow
    pub fn is_block(self) -> bool {
        !matches!(self, Display::Inline)
    }
}

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "li",
    "main", "menu", "nav", "noframes", "noscript", "ol", "output", "p",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "ul", "video",
];

/// Elements whose text is whitespace-significant
pub const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "listing", "plaintext", "textarea"];

/// Tag classification table; unknown tags are inline.
///
/// Overrides are kept in a sorted map so lookups never depend on hash order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTable {
    entries: BTreeMap<String, Display>,
}

impl DisplayTable {
    /// Classify `tag`
    pub fn display(&self, tag: &str) -> Display {
        self.entries
            .get(&tag.to_lowercase())
            .copied()
            .unwrap_or(Display::Inline)
    }

    /// Check if a tag is a block-level element
    pub fn is_block(&self, tag: &str) -> bool {
        self.display(tag).is_block()
    }

    /// Check if a tag keeps its whitespace
    pub fn is_preformatted(&self, tag: &str) -> bool {
        self.display(tag) == Display::Preformatted
    }

    /// Reclassify `tag`
    pub fn set(&mut self, tag: &str, display: Display) -> &mut Self {
        self.entries.insert(tag.to_lowercase(), display);
        self
    }

    /// Display of a node; text and comments are inline
    pub fn node_display(&self, node: &Node) -> Display {
        match node {
            Node::Element(element) => self.display(element.tag()),
            _ => Display::Inline,
        }
    }
}

impl Default for DisplayTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for tag in BLOCK_ELEMENTS {
            entries.insert((*tag).to_string(), Display::Block);
        }
        for tag in PREFORMATTED_ELEMENTS {
            entries.insert((*tag).to_string(), Display::Preformatted);
        }
        entries.insert(FRAGMENT_TAG.to_string(), Display::Block);
        Self { entries }
    }
}

static COLLAPSIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\n\r\x0C]+").expect("whitespace pattern is valid"));

/// Collapse whitespace in text
pub fn collapse_whitespace(s: &str) -> String {
    COLLAPSIBLE.replace_all(s, " ").into_owned()
}

/// True when `s` is made only of collapsible whitespace (or is empty)
pub fn is_blank(s: &str) -> bool {
    s.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C'))
}

/// Decide whether the whitespace-only text node at `index` should vanish.
///
/// It is dropped when a neighbouring sibling is block-level, or when it sits
/// at the start or end of a block-level parent. Between two inline siblings
/// it separates words and is kept. Comments are skipped when looking for
/// neighbours.
pub fn strip_blank_text(
    siblings: &[Node],
    index: usize,
    parent_is_block: bool,
    table: &DisplayTable,
) -> bool {
    let is_content = |node: &&Node| !matches!(node, Node::Comment(_));
    let prev = siblings[..index].iter().rev().find(is_content);
    let next = siblings.get(index + 1..).and_then(|rest| rest.iter().find(is_content));

    let neighbour_breaks = |neighbour: Option<&Node>| match neighbour {
        Some(node) => table.node_display(node).is_block(),
        None => parent_is_block,
    };

    neighbour_breaks(prev) || neighbour_breaks(next)
}

/// Split `content` into leading whitespace, body and trailing whitespace.
///
/// Used to move whitespace outside inline delimiters: `<em> x </em>` must
/// become ` _x_ `, not `_ x _`.
pub fn flanking_whitespace(content: &str) -> (&str, &str, &str) {
    let body_start = content.len() - content.trim_start_matches(' ').len();
    let leading = &content[..body_start];
    let rest = &content[body_start..];
    let body = rest.trim_end_matches(' ');
    let trailing = &rest[body.len()..];
    (leading, body, trailing)
}

/// Append an inline piece, collapsing a space that would double up across
/// the boundary. Spaces right after a line break are dropped.
pub fn push_inline(out: &mut String, piece: &str) {
    let piece = if out.ends_with('\n') {
        piece.trim_start_matches(' ')
    } else if out.ends_with(' ') {
        piece.strip_prefix(' ').unwrap_or(piece)
    } else {
        piece
    };
    out.push_str(piece);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let table = DisplayTable::default();
        assert_eq!(table.display("div"), Display::Block);
        assert_eq!(table.display("P"), Display::Block);
        assert_eq!(table.display("pre"), Display::Preformatted);
        assert_eq!(table.display("span"), Display::Inline);
        assert_eq!(table.display("custom-widget"), Display::Inline);
        assert!(table.is_block("pre"));
        assert!(!table.is_block("a"));
    }

    #[test]
    fn test_override_classification() {
        let mut table = DisplayTable::default();
        table.set("custom-widget", Display::Block).set("div", Display::Inline);
        assert!(table.is_block("custom-widget"));
        assert!(!table.is_block("div"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  \n\t b"), "a b");
        assert_eq!(collapse_whitespace("\n lead"), " lead");
        assert_eq!(collapse_whitespace("keep\u{a0}\u{a0}nbsp"), "keep\u{a0}\u{a0}nbsp");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(" \n\t"));
        assert!(is_blank(""));
        assert!(!is_blank("\u{a0}"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_strip_blank_between_blocks() {
        let table = DisplayTable::default();
        let siblings = vec![
            Node::element("p"),
            Node::text("\n  "),
            Node::element("p"),
        ];
        assert!(strip_blank_text(&siblings, 1, false, &table));
    }

    #[test]
    fn test_keep_blank_between_inlines() {
        let table = DisplayTable::default();
        let siblings = vec![
            Node::element("b"),
            Node::text(" "),
            Node::comment("x"),
            Node::element("i"),
        ];
        assert!(!strip_blank_text(&siblings, 1, true, &table));
    }

    #[test]
    fn test_strip_blank_at_block_edge() {
        let table = DisplayTable::default();
        let siblings = vec![Node::text(" "), Node::element("b")];
        assert!(strip_blank_text(&siblings, 0, true, &table));
        assert!(!strip_blank_text(&siblings, 0, false, &table));
    }

    #[test]
    fn test_flanking_whitespace() {
        assert_eq!(flanking_whitespace(" x y  "), (" ", "x y", "  "));
        assert_eq!(flanking_whitespace("x"), ("", "x", ""));
        assert_eq!(flanking_whitespace("   "), ("   ", "", ""));
    }

    #[test]
    fn test_push_inline() {
        let mut out = String::from("Hello ");
        push_inline(&mut out, " world");
        assert_eq!(out, "Hello world");
        push_inline(&mut out, "!");
        assert_eq!(out, "Hello world!");

        let mut broken = String::from("line\\\n");
        push_inline(&mut broken, "  next");
        assert_eq!(broken, "line\\\nnext");
    }
}
